// =========================================================
// TreeSumExplorer — attaque SMIA fusionnant les canaux
// cardinal + somme de PSI-SUM.
//
// Idée : connaissant (c, S) pour un ensemble A, énumérer
// hors-ligne tous les sous-ensembles de taille c dont la
// somme vaut S (problème « n-sum », backtracking trié avec
// élagage des doublons). Quand un seul candidat subsiste,
// l'appartenance est entièrement résolue sans appel
// supplémentaire : le candidat part en Z⁺, son complément
// dans le nœud en Z⁻.
//
// Si l'univers est trop grand pour l'énumération, on
// échantillonne un sous-univers de taille L obtenue par
// recherche dichotomique (solve_equation) sur le coût
// combinatoire L^(L/densité − 1) ≈ budget_calcul / τ.
// La comparaison se fait en log10 exact :
// (L/densité − 1)·log10(L), sans exponentiation en grands
// entiers.
// =========================================================

use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

// ─────────────────────────────────────────────────────────
// Énumérateur n-sum
// ─────────────────────────────────────────────────────────

/// Toutes les combinaisons uniques de `n` valeurs de `nums` dont la somme
/// vaut `target`. L'entrée est triée ; un doublon à la même profondeur est
/// élagué (`nums[i] == nums[i-1]`), chaque combinaison n'apparaît qu'une fois.
pub fn n_sum(nums: &[i64], target: i64, n: usize) -> Vec<Vec<i64>> {
    let mut sorted_nums = nums.to_vec();
    sorted_nums.sort_unstable();
    let mut res = Vec::new();
    let mut paths = Vec::new();
    backtrack_int(&sorted_nums, target, n, &mut paths, &mut res);
    res
}

fn backtrack_int(
    nums: &[i64],
    target: i64,
    n: usize,
    paths: &mut Vec<i64>,
    res: &mut Vec<Vec<i64>>,
) {
    if target < 0 || paths.len() > n {
        return;
    }
    if target == 0 && paths.len() == n {
        res.push(paths.clone());
        return;
    }
    for i in 0..nums.len() {
        if i > 0 && nums[i] == nums[i - 1] {
            continue;
        }
        paths.push(nums[i]);
        backtrack_int(&nums[i + 1..], target - nums[i], n, paths, res);
        paths.pop();
    }
}

// ─────────────────────────────────────────────────────────
// Dimensionnement du sous-univers échantillonné
// ─────────────────────────────────────────────────────────

// Coût combinatoire en log10 : log10(L^(L/densité − 1)),
// calculé comme (L/densité − 1)·log10(L) pour rester exact
// sans exponentiation transcendante sur de grands entiers.
fn computation_complexity(length: i64, dense: usize) -> f64 {
    let exponent = length / dense as i64 - 1;
    exponent as f64 * (length as f64).log10()
}

/// Recherche dichotomique de la taille L de sous-univers telle que le coût
/// d'énumération colle au budget de calcul par appel restant.
pub fn solve_equation(
    lower_bound: i64,
    upper_bound: i64,
    tau: i64,
    computation_budget: f64,
    dense: usize,
    tol: f64,
) -> usize {
    let val = (computation_budget / tau as f64).log10();
    let mut lower = lower_bound;
    let mut upper = upper_bound;
    let mut out: i64 = 0;
    while lower < upper {
        let middle = (upper + lower) / 2;
        let cur = computation_complexity(middle, dense);
        if (cur - val).abs() < tol {
            return middle.max(0) as usize;
        } else if cur > val {
            upper = middle - 1;
        } else {
            out = middle;
            lower = middle + 1;
        }
    }
    out.max(0) as usize
}

// ─────────────────────────────────────────────────────────
// File à priorité
// ─────────────────────────────────────────────────────────

struct ForestEntry {
    priority: f64,
    cardinality: usize,
    sum: i64,
    node: HashSet<i64>,
    candidates: Vec<Vec<i64>>,
    idx: u64,
}

impl PartialEq for ForestEntry {
    fn eq(&self, other: &Self) -> bool {
        self.idx == other.idx
    }
}

impl Eq for ForestEntry {}

impl PartialOrd for ForestEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ForestEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // min-tas sur (priority, cardinality, sum, idx)
        other
            .priority
            .partial_cmp(&self.priority)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.cardinality.cmp(&self.cardinality))
            .then_with(|| other.sum.cmp(&self.sum))
            .then_with(|| other.idx.cmp(&self.idx))
    }
}

// Couverture espérée d'un nœud : |A| si l'énumération tient dans le budget,
// sinon |A|·(1 − (1 − 1/|candidats|)^τ), l'espérance de candidats uniques
// visités en τ tirages aléatoires.
fn node_priority(node_len: usize, candidates_len: usize, tau: i64) -> f64 {
    if candidates_len as i64 <= tau {
        node_len as f64
    } else {
        node_len as f64 * (1.0 - (1.0 - 1.0 / candidates_len as f64).powi(tau.max(0) as i32))
    }
}

// ─────────────────────────────────────────────────────────
// Attaque
// ─────────────────────────────────────────────────────────

/// Attaque TreeSumExplorer sur PSI-SUM (vecteur d'entiers).
///
/// `psi_sum` rend (cardinal, somme) de l'intersection ; chaque appel coûte
/// une unité de τ. La boucle externe relance l'exploration sur
/// X \ (Z⁺ ∪ Z⁻) tant qu'il reste du budget et des indéterminés.
pub fn psi_sum_attack<F, R>(
    victim_x: &HashSet<i64>,
    mut psi_sum: F,
    tau: i64,
    computation_budget: f64,
    rng: &mut R,
) -> (HashSet<i64>, HashSet<i64>)
where
    F: FnMut(&HashSet<i64>) -> (usize, i64),
    R: Rng,
{
    let mut z_pos: HashSet<i64> = HashSet::new();
    let mut z_neg: HashSet<i64> = HashSet::new();
    let mut tau = tau;

    while tau > 0 {
        let remaining: HashSet<i64> = victim_x
            .iter()
            .filter(|v| !z_pos.contains(v) && !z_neg.contains(v))
            .copied()
            .collect();
        if remaining.is_empty() {
            break;
        }
        tau = psi_sum_helper(
            &remaining,
            &mut psi_sum,
            tau,
            computation_budget,
            &mut z_pos,
            &mut z_neg,
            rng,
        );
    }

    debug_assert!(
        z_pos.is_disjoint(&z_neg),
        "Z+ et Z- doivent être disjoints"
    );
    (z_pos, z_neg)
}

fn psi_sum_helper<F, R>(
    victim_x: &HashSet<i64>,
    psi_sum: &mut F,
    mut tau: i64,
    computation_budget: f64,
    z_pos: &mut HashSet<i64>,
    z_neg: &mut HashSet<i64>,
    rng: &mut R,
) -> i64
where
    F: FnMut(&HashSet<i64>) -> (usize, i64),
    R: Rng,
{
    let mut forest: BinaryHeap<ForestEntry> = BinaryHeap::new();
    let mut idx: u64 = 0;

    let mut victim: HashSet<i64> = victim_x.clone();
    let (mut current_cardinality, mut current_sum) = psi_sum(&victim);
    tau -= 1;
    if tau == 0 {
        return tau;
    }

    // Univers trop vaste pour l'énumération directe : on se rabat sur un
    // sous-univers échantillonné dont le coût combinatoire tient dans le
    // budget de calcul par appel restant
    if current_cardinality > 0 {
        let enumeration_cost =
            (current_cardinality as f64 - 1.0) * (victim.len() as f64).log10();
        let per_call_budget = (computation_budget / tau as f64).log10();
        if enumeration_cost >= per_call_budget {
            let dense = victim.len() / current_cardinality;
            let candidate_size = solve_equation(0, 500, tau, computation_budget, dense, 1e-5);
            let mut items: Vec<i64> = victim.iter().copied().collect();
            items.shuffle(rng);
            items.truncate(candidate_size);
            victim = items.into_iter().collect();
            let (c, s) = psi_sum(&victim);
            current_cardinality = c;
            current_sum = s;
            tau -= 1;
        }
    }

    let items: Vec<i64> = victim.iter().copied().collect();
    let candidate_list = n_sum(&items, current_sum, current_cardinality);
    let priority = node_priority(victim.len(), candidate_list.len(), tau);
    forest.push(ForestEntry {
        priority: -priority,
        cardinality: current_cardinality,
        sum: current_sum,
        node: victim,
        candidates: candidate_list,
        idx,
    });
    idx += 1;

    while let Some(entry) = forest.pop() {
        let mut victim = entry.node;
        let mut current_cardinality = entry.cardinality;
        let mut current_sum = entry.sum;
        let mut candidate_list = entry.candidates;

        while candidate_list.len() > 1 && tau > 0 {
            // Le premier candidat sert d'hypothèse « gauche » ; un appel
            // donne sa vérité, le complément s'en déduit par soustraction
            let left_items = candidate_list[0].clone();
            let left_node: HashSet<i64> = left_items.iter().copied().collect();
            let right_node: HashSet<i64> = victim.difference(&left_node).copied().collect();

            let (left_cardinality, left_sum) = psi_sum(&left_node);
            tau -= 1;
            let right_cardinality = current_cardinality - left_cardinality;
            let right_sum = current_sum - left_sum;

            let right_items: Vec<i64> = right_node.iter().copied().collect();
            let left_candidate_list = n_sum(&left_items, left_sum, left_cardinality);
            let right_candidate_list = n_sum(&right_items, right_sum, right_cardinality);
            let left_priority = node_priority(left_node.len(), left_candidate_list.len(), tau);
            let right_priority = node_priority(right_node.len(), right_candidate_list.len(), tau);

            if left_priority > right_priority {
                forest.push(ForestEntry {
                    priority: -right_priority,
                    cardinality: right_cardinality,
                    sum: right_sum,
                    node: right_node,
                    candidates: right_candidate_list,
                    idx,
                });
                idx += 1;
                victim = left_node;
                current_cardinality = left_cardinality;
                candidate_list = left_candidate_list;
                current_sum = left_sum;
            } else {
                forest.push(ForestEntry {
                    priority: -left_priority,
                    cardinality: left_cardinality,
                    sum: left_sum,
                    node: left_node,
                    candidates: left_candidate_list,
                    idx,
                });
                idx += 1;
                victim = right_node;
                current_cardinality = right_cardinality;
                candidate_list = right_candidate_list;
                current_sum = right_sum;
            }
        }

        // Fuite terminale : un candidat unique résout tout le nœud
        if candidate_list.len() == 1 && tau >= 0 {
            let chosen: HashSet<i64> = candidate_list[0].iter().copied().collect();
            for v in victim.difference(&chosen) {
                z_neg.insert(*v);
            }
            z_pos.extend(chosen);
        }
    }
    tau
}

// ============================================================================
// Tests unitaires
// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::psi_sum_int;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::Cell;

    #[test]
    fn test_n_sum_elagage_des_doublons() {
        // [1,1,2,3], cible 4, n = 2 : une seule solution [1,3]
        assert_eq!(n_sum(&[1, 1, 2, 3], 4, 2), vec![vec![1, 3]]);
    }

    #[test]
    fn test_n_sum_plusieurs_solutions() {
        let res = n_sum(&[1, 2, 3, 4], 5, 2);
        assert_eq!(res, vec![vec![1, 4], vec![2, 3]]);
    }

    #[test]
    fn test_n_sum_ensemble_vide_cible_nulle() {
        // Cardinal 0 : l'unique « combinaison » est l'ensemble vide
        assert_eq!(n_sum(&[2, 3], 0, 0), vec![Vec::<i64>::new()]);
    }

    #[test]
    fn test_solve_equation_bornes() {
        let l = solve_equation(0, 500, 10, 1e10, 3, 1e-5);
        assert!(l <= 500);
        // Le coût en L est croissant : L doit respecter le budget
        let val = (1e10f64 / 10.0).log10();
        if l > 1 {
            assert!((l as f64 / 3.0 - 1.0).floor() * (l as f64).log10() <= val + 1.0);
        }
    }

    #[test]
    fn test_attaque_sommes_uniques() {
        // Valeurs en puissances de deux : chaque somme identifie son
        // sous-ensemble, la résolution tombe en un appel
        let x: HashSet<i64> = [1, 2, 4, 8, 16].into_iter().collect();
        let y: HashSet<i64> = [2, 8, 64].into_iter().collect();
        let calls = Cell::new(0usize);
        let mut rng = StdRng::seed_from_u64(9);
        let (z_pos, z_neg) = psi_sum_attack(
            &x,
            |a| {
                calls.set(calls.get() + 1);
                psi_sum_int(a, &y)
            },
            10,
            1e10,
            &mut rng,
        );
        assert_eq!(z_pos, [2, 8].into_iter().collect());
        assert_eq!(z_neg, [1, 4, 16].into_iter().collect());
        assert!(calls.get() <= 10);
    }

    #[test]
    fn test_attaque_avec_ambiguite() {
        // Somme 5 sur {1,2,3,4} : deux candidats, une descente tranche
        let x: HashSet<i64> = [1, 2, 3, 4].into_iter().collect();
        let y: HashSet<i64> = [1, 4].into_iter().collect();
        let calls = Cell::new(0usize);
        let mut rng = StdRng::seed_from_u64(3);
        let (z_pos, z_neg) = psi_sum_attack(
            &x,
            |a| {
                calls.set(calls.get() + 1);
                psi_sum_int(a, &y)
            },
            10,
            1e10,
            &mut rng,
        );
        assert_eq!(z_pos, [1, 4].into_iter().collect());
        assert_eq!(z_neg, [2, 3].into_iter().collect());
        assert!(calls.get() <= 10);
    }

    #[test]
    fn test_intersection_vide() {
        let x: HashSet<i64> = [3, 5, 7].into_iter().collect();
        let y: HashSet<i64> = [11, 13].into_iter().collect();
        let mut rng = StdRng::seed_from_u64(1);
        let (z_pos, z_neg) = psi_sum_attack(&x, |a| psi_sum_int(a, &y), 5, 1e10, &mut rng);
        assert!(z_pos.is_empty());
        assert_eq!(z_neg, x);
    }

    #[test]
    fn test_budget_respecte() {
        let x: HashSet<i64> = (1..=12).collect();
        let y: HashSet<i64> = [2, 5, 9, 11].into_iter().collect();
        for tau in 1..=8i64 {
            let calls = Cell::new(0i64);
            let mut rng = StdRng::seed_from_u64(tau as u64);
            let (z_pos, z_neg) = psi_sum_attack(
                &x,
                |a| {
                    calls.set(calls.get() + 1);
                    psi_sum_int(a, &y)
                },
                tau,
                1e10,
                &mut rng,
            );
            assert!(calls.get() <= tau, "compteur {} > τ {tau}", calls.get());
            assert!(z_pos.is_disjoint(&z_neg));
            assert!(z_pos.iter().all(|e| y.contains(e)));
            assert!(z_neg.iter().all(|e| !y.contains(e)));
        }
    }
}
