// =========================================================
// ActBayesian — attaque par mise à jour de posterior.
//
// Chaque élément de la victime porte un posterior p ∈ [0,1]
// (probabilité d'appartenance à Y), initialisé à un prior
// global appris en un appel bruité. À chaque tour :
// sélection des indices au-dessus d'un seuil adaptatif,
// partage aléatoire en ensembles positif/négatif au taux ρ,
// un appel (bruité Laplace) sur l'ensemble positif, puis
// mise à jour des posteriors et absorption aux bornes
// (p ≥ U → 1, p ≤ L → 0, états absorbants).
//
// Le bruit de Laplace est tiré à chaque point d'usage
// (tirage frais par consommation, et non un unique tirage
// réutilisé).
//
// L'oracle est simulé localement sur un vecteur binaire d :
// d[i] = 1 ssi l'élément i de X appartient à Y.
// =========================================================

use crate::gcms::gcms_utils::generate_laplace_noise;
use rand::Rng;

/// Bilan d'une exécution : fuites vraies et erreurs d'assignation.
///
/// `pos_err` est rapporté à 0 dès que `true_pos_leak` vaut 0, symétriquement
/// pour les négatifs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActBayesianOutcome {
    pub true_pos_leak: usize,
    pub true_neg_leak: usize,
    pub pos_err: usize,
    pub neg_err: usize,
}

// Valeurs distinctes triées par ordre décroissant
fn distinct_descending(posterior: &[f64]) -> Vec<f64> {
    let mut values = posterior.to_vec();
    values.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
    values.dedup();
    values
}

/// Attaque ActBayesian.
///
/// * `tau` : budget d'appels protocole.
/// * `lower_bound`, `upper_bound` : seuils absorbants L et U.
/// * `dataset` : vecteur binaire d'appartenance (0/1).
/// * `tolerance` : marge δ retranchée au seuil de sélection.
/// * `laplacian_scale` : échelle β du bruit de Laplace (0 = sans bruit).
/// * `sample_rate` : taux d'échantillonnage ρ du partage positif/négatif.
pub fn actbayesian<R: Rng>(
    tau: i64,
    lower_bound: f64,
    upper_bound: f64,
    dataset: &[u8],
    tolerance: f64,
    laplacian_scale: f64,
    sample_rate: f64,
    rng: &mut R,
) -> ActBayesianOutcome {
    let laplacian_location = 0.0;
    let n = dataset.len();
    if n == 0 {
        return ActBayesianOutcome {
            true_pos_leak: 0,
            true_neg_leak: 0,
            pos_err: 0,
            neg_err: 0,
        };
    }

    // Un appel consommé pour apprendre la somme bruitée et en tirer le prior
    let mut tau = tau - 1;
    let summation_true: f64 = dataset.iter().map(|&d| d as f64).sum();
    let laplacian_noise = generate_laplace_noise(laplacian_location, laplacian_scale, rng);
    let summation = (summation_true + laplacian_noise * summation_true).clamp(0.0, n as f64);
    let prior = summation / n as f64;

    let mut posterior = vec![prior; n];
    tau -= 1;

    while tau >= 0 {
        // Seuil de sélection : juste sous le posterior maximal non absorbé
        let max_posterior = posterior.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let positive_bar = if max_posterior < 1.0 {
            max_posterior - tolerance
        } else {
            let distinct = distinct_descending(&posterior);
            if distinct.len() < 2 {
                break;
            }
            distinct[1] - tolerance
        };

        let mut positive_set: Vec<usize> = Vec::new();
        let mut negative_set: Vec<usize> = Vec::new();
        let mut expected_psi_cardinality = 0.0f64;
        for (j, &cur_posterior) in posterior.iter().enumerate() {
            if cur_posterior >= positive_bar {
                if rng.gen_bool(sample_rate) {
                    positive_set.push(j);
                } else {
                    negative_set.push(j);
                }
                expected_psi_cardinality += cur_posterior;
            }
        }

        // Partage dégénéré : on fige les indices sélectionnés au plus proche
        // état absorbant et on recommence le tour (aucun appel consommé)
        if positive_set.is_empty() {
            for &j in &negative_set {
                posterior[j] = if posterior[j] >= 0.5 { 1.0 } else { 0.0 };
            }
            continue;
        }
        if negative_set.is_empty() {
            for &j in &positive_set {
                posterior[j] = if posterior[j] >= 0.5 { 1.0 } else { 0.0 };
            }
            continue;
        }

        // Un appel protocole, approximé localement et bruité
        let real_cardinality = positive_set
            .iter()
            .filter(|&&j| dataset[j] == 1)
            .count() as f64;
        let laplacian_noise = generate_laplace_noise(laplacian_location, laplacian_scale, rng);
        let real_psi_cardinality_returned = (real_cardinality
            + laplacian_noise * 0.1 * real_cardinality)
            .clamp(0.0, positive_set.len() as f64);

        let in_setprior = real_psi_cardinality_returned / positive_set.len() as f64;
        let out_setprior =
            (expected_psi_cardinality - real_psi_cardinality_returned) / negative_set.len() as f64;

        for &j in &positive_set {
            posterior[j] = in_setprior;
        }
        for &j in &negative_set {
            posterior[j] = out_setprior;
        }

        // Absorption aux bornes
        for p in posterior.iter_mut() {
            if *p >= upper_bound {
                *p = 1.0;
            }
            if *p <= lower_bound {
                *p = 0.0;
            }
        }

        // Tout le vecteur est absorbé dans {0, 1} : plus rien à apprendre
        let all_binary = posterior.iter().all(|&p| p == 0.0 || p == 1.0);
        let has_zero = posterior.iter().any(|&p| p == 0.0);
        let has_one = posterior.iter().any(|&p| p == 1.0);
        if all_binary && has_zero && has_one {
            break;
        }
        tau -= 1;
    }

    // Bilan : fuites vraies et erreurs, avec la règle de rapport
    let mut error_pos = 0usize;
    let mut error_neg = 0usize;
    let mut true_pos_leak = 0usize;
    let mut true_neg_leak = 0usize;
    for (j, &p) in posterior.iter().enumerate() {
        if p == 1.0 {
            if dataset[j] == 0 {
                error_pos += 1;
            } else {
                true_pos_leak += 1;
            }
        } else if p == 0.0 {
            if dataset[j] == 1 {
                error_neg += 1;
            } else {
                true_neg_leak += 1;
            }
        }
    }
    let pos_err = if true_pos_leak == 0 { 0 } else { error_pos };
    let neg_err = if true_neg_leak == 0 { 0 } else { error_neg };

    ActBayesianOutcome {
        true_pos_leak,
        true_neg_leak,
        pos_err,
        neg_err,
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_dataset_uniforme_positif() {
        // Tout le vecteur vaut 1 : le prior vaut 1, aucune valeur seconde
        // distincte, l'attaque s'arrête et rapporte n fuites positives
        let dataset = vec![1u8; 10];
        let mut rng = StdRng::seed_from_u64(4);
        let outcome = actbayesian(20, 0.25, 0.8, &dataset, 0.1, 0.0, 0.5, &mut rng);
        assert_eq!(outcome.true_pos_leak, 10);
        assert_eq!(outcome.pos_err, 0);
        assert_eq!(outcome.neg_err, 0);
    }

    #[test]
    fn test_dataset_uniforme_negatif() {
        // Prior 0 : posteriors absorbés à 0, fuite négative totale
        let dataset = vec![0u8; 8];
        let mut rng = StdRng::seed_from_u64(4);
        let outcome = actbayesian(20, 0.25, 0.8, &dataset, 0.1, 0.0, 0.5, &mut rng);
        assert_eq!(outcome.true_neg_leak, 8);
        assert_eq!(outcome.pos_err, 0);
        assert_eq!(outcome.neg_err, 0);
    }

    #[test]
    fn test_regle_de_rapport_et_bornes() {
        let dataset: Vec<u8> = (0..20).map(|i| (i % 3 == 0) as u8).collect();
        let ones = dataset.iter().filter(|&&d| d == 1).count();
        let zeros = dataset.len() - ones;
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let outcome = actbayesian(15, 0.25, 0.8, &dataset, 0.1, 0.0, 0.5, &mut rng);
            assert!(outcome.true_pos_leak <= ones);
            assert!(outcome.true_neg_leak <= zeros);
            if outcome.true_pos_leak == 0 {
                assert_eq!(outcome.pos_err, 0);
            }
            if outcome.true_neg_leak == 0 {
                assert_eq!(outcome.neg_err, 0);
            }
        }
    }

    #[test]
    fn test_dataset_vide() {
        let mut rng = StdRng::seed_from_u64(1);
        let outcome = actbayesian(5, 0.25, 0.8, &[], 0.1, 0.0, 0.5, &mut rng);
        assert_eq!(outcome.true_pos_leak, 0);
        assert_eq!(outcome.true_neg_leak, 0);
    }
}
