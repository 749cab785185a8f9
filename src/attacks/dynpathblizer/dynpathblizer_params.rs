// ============================================================================
// LeakageMemo — tables mémoïsées (γ, φ) du planificateur dynamique
//
// Pré-calcul par programmation dynamique, consommé par dynpathblizer.rs :
//
//   γ(n, c, τ) : pour un nœud de taille n dont on sait que c éléments sont
//                dans Y, avec τ appels restants, la fuite espérée maximale
//                et le facteur de partition k* qui l'atteint.
//   φ(n, c)    : le plus petit τ pour lequel la fuite espérée atteint n
//                (budget de fuite totale). φ(n,0) = φ(n,n) = 0.
//
// La récurrence somme, pour chaque k, sur les compositions possibles du
// cardinal c de l'enfant gauche, pondérées par la probabilité
// hypergéométrique C(c_n,c)·C(n−c_n,k−c)/C(n,k), en envisageant les deux
// ordres d'exploration (gauche d'abord / droite d'abord).
//
// Représentation : tableaux denses indexés par (n, c, τ) avec c ≤ n et
// τ ≤ n. Les clés textuelles "S(n,c,τ)" de la version de recherche sont un
// accident d'implémentation, pas une sémantique : ici l'indexation est
// directe. Symétrie maintenue à l'écriture : γ(n,c,τ) = γ(n,n−c,τ).
//
// Une fois construit, le mémo est immuable et partageable entre attaques.
// Une entrée absente à la lecture est fatale : cela signale un mémo
// construit pour un n_max trop petit (panic avec message explicite).
// ============================================================================

const UNSET: usize = usize::MAX;

pub struct LeakageMemo {
    size: usize,
    // gamma[n][c][tau] = (fuite espérée, k*)
    gamma: Vec<Vec<Vec<(f64, usize)>>>,
    // phi[n][c] = budget minimal de fuite totale
    phi: Vec<Vec<usize>>,
}

// ─────────────────────────────────────────────────────────
// Coefficient binomial en flottant, produit incrémental.
// Précision relative ~1e-14, largement suffisante pour des
// rapports de probabilités hypergéométriques.
// ─────────────────────────────────────────────────────────
fn comb(n: usize, k: usize) -> f64 {
    if k > n {
        return 0.0;
    }
    let k = k.min(n - k);
    let mut acc = 1.0f64;
    for i in 0..k {
        acc = acc * (n - i) as f64 / (i + 1) as f64;
    }
    acc
}

impl LeakageMemo {
    /// Construit les tables γ et φ pour tous les états (n, c, τ) avec
    /// n ≤ `size`. Coût O(size⁴) environ : size = 200 reste confortable.
    pub fn build(size: usize) -> LeakageMemo {
        let mut gamma: Vec<Vec<Vec<(f64, usize)>>> = (0..=size)
            .map(|n| vec![vec![(f64::NAN, 0usize); n + 1]; n + 1])
            .collect();
        let mut phi: Vec<Vec<usize>> = (0..=size).map(|n| vec![UNSET; n + 1]).collect();

        // Cas de base n = 1 : un singleton est entièrement déterminé
        if size >= 1 {
            for c in 0..=1 {
                for t in 0..=1 {
                    gamma[1][c][t] = (1.0, 0);
                }
                phi[1][c] = 0;
            }
        }

        for n in 2..=size {
            for c_n in 0..=n.div_ceil(2) {
                let c_rev = n - c_n;
                for tau in 0..=n {
                    if c_n == 0 || c_n == n {
                        // État déjà résolu : fuite n sans aucun appel
                        phi[n][c_n] = 0;
                        phi[n][c_rev] = 0;
                        for t in 0..=n {
                            gamma[n][c_n][t] = (n as f64, 0);
                            gamma[n][c_rev][t] = (n as f64, 0);
                        }
                        break;
                    } else if tau >= n {
                        gamma[n][c_n][tau] = (n as f64, n / 2);
                        gamma[n][c_rev][tau] = (n as f64, n / 2);
                    } else if tau == 0 {
                        gamma[n][c_n][tau] = (0.0, 0);
                        gamma[n][c_rev][tau] = (0.0, 0);
                    } else {
                        let mut expected_leakage = 0.0f64;
                        let mut max_k = 0usize;

                        for k in 1..=(n / 2) {
                            let mut left_leakage = 0.0f64;
                            let mut right_leakage = 0.0f64;

                            let c_min = c_n.saturating_sub(n - k);
                            let c_max = k.min(c_n);
                            for c in c_min..=c_max {
                                let prob = comb(c_n, c) * comb(n - c_n, k - c) / comb(n, k);
                                let left_call_need = phi[k][c];
                                let right_call_need = phi[n - k][c_n - c];
                                debug_assert!(
                                    left_call_need != UNSET && right_call_need != UNSET,
                                    "φ enfant non calculé pour ({k},{c}) ou ({},{})",
                                    n - k,
                                    c_n - c
                                );

                                // Exploration de l'enfant gauche d'abord
                                if tau - 1 < left_call_need {
                                    left_leakage += prob * gamma[k][c][tau - 1].0;
                                    // L'autre sous-état peut être gratuit s'il est
                                    // déjà entièrement déterminé
                                    if c_n == c || c_n - c == n - k {
                                        left_leakage += prob * (n - k) as f64;
                                    }
                                } else {
                                    left_leakage += prob * k as f64;
                                    if tau - 1 - left_call_need < right_call_need {
                                        left_leakage +=
                                            prob * gamma[n - k][c_n - c][tau - 1 - left_call_need].0;
                                    } else {
                                        left_leakage += prob * (n - k) as f64;
                                    }
                                }

                                // Exploration de l'enfant droit d'abord
                                if tau - 1 < right_call_need {
                                    right_leakage += prob * gamma[n - k][c_n - c][tau - 1].0;
                                    if c == 0 || c == k {
                                        right_leakage += prob * k as f64;
                                    }
                                } else {
                                    right_leakage += prob * (n - k) as f64;
                                    if tau - 1 - right_call_need < left_call_need {
                                        right_leakage +=
                                            prob * gamma[k][c][tau - 1 - right_call_need].0;
                                    } else {
                                        right_leakage += prob * k as f64;
                                    }
                                }
                            }

                            if left_leakage >= expected_leakage {
                                expected_leakage = left_leakage;
                                max_k = max_k.max(k);
                            }
                            if right_leakage >= expected_leakage {
                                expected_leakage = right_leakage;
                                max_k = max_k.max(k);
                            }
                        }

                        gamma[n][c_n][tau] = (expected_leakage, max_k);
                        gamma[n][c_rev][tau] = (expected_leakage, max_k);

                        // Tolérance : les poids hypergéométriques ne somment à 1
                        // qu'aux arrondis f64 près, la saturation ne doit pas
                        // échapper d'un ulp
                        if expected_leakage >= n as f64 - 1e-9 {
                            // Première saturation : φ est atteint, les budgets
                            // supérieurs sont figés à la fuite totale
                            phi[n][c_n] = phi[n][c_n].min(tau);
                            phi[n][c_rev] = phi[n][c_rev].min(tau);
                            for t in (tau + 1)..=n {
                                gamma[n][c_n][t] = (n as f64, n / 2);
                                gamma[n][c_rev][t] = (n as f64, n / 2);
                            }
                            break;
                        }
                    }
                }
            }
        }

        LeakageMemo { size, gamma, phi }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Lecture γ(n, c, τ) : (fuite espérée, k*).
    pub fn gamma(&self, n: usize, c: usize, tau: usize) -> (f64, usize) {
        match self
            .gamma
            .get(n)
            .and_then(|by_c| by_c.get(c))
            .and_then(|by_tau| by_tau.get(tau))
            .copied()
        {
            Some((leakage, k)) if !leakage.is_nan() => (leakage, k),
            _ => panic!(
                "entrée gamma({n},{c},{tau}) absente : mémo construit pour n_max={}",
                self.size
            ),
        }
    }

    /// Lecture φ(n, c) : budget minimal de fuite totale.
    pub fn phi(&self, n: usize, c: usize) -> usize {
        match self.phi.get(n).and_then(|by_c| by_c.get(c)).copied() {
            Some(v) if v != UNSET => v,
            _ => panic!(
                "entrée phi({n},{c}) absente : mémo construit pour n_max={}",
                self.size
            ),
        }
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cas_de_base() {
        let memo = LeakageMemo::build(1);
        assert_eq!(memo.gamma(1, 0, 0), (1.0, 0));
        assert_eq!(memo.gamma(1, 1, 1), (1.0, 0));
        assert_eq!(memo.phi(1, 0), 0);
        assert_eq!(memo.phi(1, 1), 0);
    }

    #[test]
    fn test_etat_n4_fuite_totale() {
        let memo = LeakageMemo::build(4);
        let (leakage, _) = memo.gamma(4, 2, 4);
        assert_eq!(leakage, 4.0);
        assert!(memo.phi(4, 2) <= 4);
        // États résolus : aucune interrogation nécessaire
        assert_eq!(memo.phi(4, 0), 0);
        assert_eq!(memo.phi(4, 4), 0);
    }

    #[test]
    fn test_symetrie_gamma_phi() {
        let size = 9;
        let memo = LeakageMemo::build(size);
        for n in 1..=size {
            for c in 0..=n {
                assert_eq!(memo.phi(n, c), memo.phi(n, n - c), "phi({n},{c})");
                for tau in 0..=n {
                    assert_eq!(
                        memo.gamma(n, c, tau),
                        memo.gamma(n, n - c, tau),
                        "gamma({n},{c},{tau})"
                    );
                }
            }
        }
    }

    #[test]
    fn test_bornes_et_monotonie_en_tau() {
        let size = 9;
        let memo = LeakageMemo::build(size);
        for n in 1..=size {
            for c in 0..=n {
                let mut prev = -1.0f64;
                for tau in 0..=n {
                    let (leakage, k) = memo.gamma(n, c, tau);
                    assert!(
                        (0.0..=n as f64 + 1e-9).contains(&leakage),
                        "gamma({n},{c},{tau}) = {leakage} hors bornes"
                    );
                    assert!(leakage >= prev - 1e-9, "fuite non monotone en τ");
                    assert!(k <= n / 2);
                    prev = leakage;
                }
            }
        }
    }

    #[test]
    fn test_phi_borne_par_n() {
        let size = 10;
        let memo = LeakageMemo::build(size);
        for n in 1..=size {
            for c in 0..=n {
                assert!(memo.phi(n, c) <= n, "phi({n},{c}) > n");
            }
        }
    }

    #[test]
    #[should_panic(expected = "absente")]
    fn test_lecture_hors_memo_fatale() {
        let memo = LeakageMemo::build(4);
        memo.gamma(5, 2, 3);
    }
}
