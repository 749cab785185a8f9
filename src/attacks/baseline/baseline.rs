// =========================================================
// Attaque MIA de référence (USENIX22), à budget limité.
//
// Principe : descente gloutonne dans l'arbre de partition,
// guidée par la densité c/|val| de chaque nœud. Un appel
// d'oracle par étage suffit : on interroge le plus petit
// enfant et on déduit l'autre par soustraction. Les nœuds
// non explorés attendent dans la « forêt », une file à
// priorité ordonnée par densité décroissante.
//
// Comptabilité du budget : l'appel initial sur X compte pour
// un ; la descente ne fait un appel que si le compteur est
// strictement sous τ. Le compteur ne dépasse donc JAMAIS τ.
// Un nœud abandonné en pleine descente faute de budget n'est
// pas classé.
// =========================================================

use crate::partition::TreeNode;
use rand::Rng;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::hash::Hash;

// ─────────────────────────────────────────────────────────
// Entrée de la forêt
//
// `idx` est strictement croissant, injecté au push : il
// impose un ordre total déterministe sur le tas sans jamais
// comparer les nœuds eux-mêmes.
// ─────────────────────────────────────────────────────────

pub struct ForestEntry<T> {
    pub priority: f64,
    pub cardinality: usize,
    pub idx: u64,
    pub node: TreeNode<T>,
}

impl<T> PartialEq for ForestEntry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.idx == other.idx
    }
}

impl<T> Eq for ForestEntry<T> {}

impl<T> PartialOrd for ForestEntry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for ForestEntry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap est un max-tas : on inverse la comparaison pour obtenir
        // un min-tas sur (priority, cardinality, idx). Les priorités sont
        // finies par construction (jamais NaN).
        other
            .priority
            .partial_cmp(&self.priority)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.cardinality.cmp(&self.cardinality))
            .then_with(|| other.idx.cmp(&self.idx))
    }
}

// ─────────────────────────────────────────────────────────
// Attaque
// ─────────────────────────────────────────────────────────

/// Attaque de référence sur PSI-CA.
///
/// `psi_ca` est l'oracle fourni par l'appelant (un appel = une unité de τ).
/// Retourne (Z⁺, Z⁻) : membres prédits positifs et négatifs, disjoints,
/// tous deux inclus dans X. L'épuisement du budget est une terminaison
/// normale : on retourne ce qui a été déterminé.
pub fn baseline_attack_with_limited_call<T, F, R>(
    victim_x: &HashSet<T>,
    mut psi_ca: F,
    tau: usize,
    rng: &mut R,
) -> (HashSet<T>, HashSet<T>)
where
    T: Clone + Eq + Hash,
    F: FnMut(&HashSet<T>) -> usize,
    R: Rng,
{
    let mut z_pos: HashSet<T> = HashSet::new();
    let mut z_neg: HashSet<T> = HashSet::new();
    if tau == 0 || victim_x.is_empty() {
        return (z_pos, z_neg);
    }

    let mut forest: BinaryHeap<ForestEntry<T>> = BinaryHeap::new();
    let mut idx: u64 = 0;

    let initial_node_cardinality = psi_ca(victim_x);
    let mut protocol_call_num = 1usize;

    let tree = TreeNode::form_tree(victim_x, rng);
    forest.push(ForestEntry {
        priority: -(initial_node_cardinality as f64) / victim_x.len() as f64,
        cardinality: initial_node_cardinality,
        idx,
        node: tree,
    });
    idx += 1;

    let mut exhausted = false;
    while !exhausted {
        let Some(entry) = forest.pop() else { break };
        let mut node = entry.node;
        let mut current_node_cardinality = entry.cardinality;

        // Descente : tant que le nœud est mixte (ni vide ni plein)
        while 0 < current_node_cardinality && current_node_cardinality < node.val.len() {
            if protocol_call_num >= tau {
                exhausted = true;
                break;
            }
            let (Some(left_node), Some(right_node)) = (node.left.take(), node.right.take())
            else {
                break;
            };
            let left_node = *left_node;
            let right_node = *right_node;

            // Un seul appel protocole : interroger le plus petit enfant,
            // déduire l'autre par soustraction (égalité : on interroge le droit)
            let (left_cardinality, right_cardinality);
            if right_node.val.len() > left_node.val.len() {
                left_cardinality = psi_ca(&left_node.val);
                protocol_call_num += 1;
                right_cardinality = current_node_cardinality - left_cardinality;
            } else {
                right_cardinality = psi_ca(&right_node.val);
                protocol_call_num += 1;
                left_cardinality = current_node_cardinality - right_cardinality;
            }

            // La densité sert de priorité : on descend dans l'enfant le plus
            // dense, l'autre rejoint la forêt (ou Z⁻ s'il est vide)
            let right_priority = right_cardinality as f64 / right_node.val.len() as f64;
            let left_priority = left_cardinality as f64 / left_node.val.len() as f64;
            if right_priority > left_priority {
                if left_cardinality != 0 {
                    forest.push(ForestEntry {
                        priority: -(left_cardinality as f64) / left_node.val.len() as f64,
                        cardinality: left_cardinality,
                        idx,
                        node: left_node,
                    });
                    idx += 1;
                } else {
                    z_neg.extend(left_node.val);
                }
                node = right_node;
                current_node_cardinality = right_cardinality;
            } else {
                if right_cardinality != 0 {
                    forest.push(ForestEntry {
                        priority: -(right_cardinality as f64) / right_node.val.len() as f64,
                        cardinality: right_cardinality,
                        idx,
                        node: right_node,
                    });
                    idx += 1;
                } else {
                    z_neg.extend(right_node.val);
                }
                node = left_node;
                current_node_cardinality = left_cardinality;
            }
        }

        if exhausted {
            // Budget épuisé en pleine descente : le nœud courant reste indéterminé
            break;
        }
        if current_node_cardinality == node.val.len() {
            z_pos.extend(node.val);
        } else if current_node_cardinality == 0 {
            z_neg.extend(node.val);
        }
    }

    debug_assert!(
        z_pos.is_disjoint(&z_neg),
        "Z+ et Z- doivent être disjoints"
    );
    (z_pos, z_neg)
}

// ============================================================================
// Tests unitaires
// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::psi_cardinality;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::cell::Cell;

    fn run_counted(
        x: &HashSet<u64>,
        y: &HashSet<u64>,
        tau: usize,
        seed: u64,
    ) -> (HashSet<u64>, HashSet<u64>, usize) {
        let calls = Cell::new(0usize);
        let mut rng = StdRng::seed_from_u64(seed);
        let (z_pos, z_neg) = baseline_attack_with_limited_call(
            x,
            |a| {
                calls.set(calls.get() + 1);
                psi_cardinality(a, y)
            },
            tau,
            &mut rng,
        );
        (z_pos, z_neg, calls.get())
    }

    #[test]
    fn test_reconstruction_complete_petit_ensemble() {
        // X = {1,2,3,4}, Y = {3,4,5,6}, τ = 10 : reconstruction totale attendue
        let x: HashSet<u64> = [1, 2, 3, 4].into_iter().collect();
        let y: HashSet<u64> = [3, 4, 5, 6].into_iter().collect();
        for seed in 0..20 {
            let (z_pos, z_neg, calls) = run_counted(&x, &y, 10, seed);
            assert!(z_pos.is_superset(&[3, 4].into_iter().collect()));
            assert!(z_neg.is_superset(&[1, 2].into_iter().collect()));
            assert!(calls <= 10);
        }
    }

    #[test]
    fn test_x_egal_y_un_seul_appel() {
        let x: HashSet<u64> = (1..=8).collect();
        let (z_pos, z_neg, calls) = run_counted(&x, &x, 1, 3);
        assert_eq!(z_pos, x);
        assert!(z_neg.is_empty());
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_ensembles_disjoints_un_seul_appel() {
        let x: HashSet<u64> = (1..=8).collect();
        let y: HashSet<u64> = (100..=108).collect();
        let (z_pos, z_neg, calls) = run_counted(&x, &y, 1, 3);
        assert!(z_pos.is_empty());
        assert_eq!(z_neg, x);
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_invariants_sous_budget_serre() {
        // Oracle sans bruit : aucun faux positif quel que soit le budget
        let x: HashSet<u64> = (0..32).collect();
        let y: HashSet<u64> = (16..48).collect();
        for tau in 1..=20 {
            let (z_pos, z_neg, calls) = run_counted(&x, &y, tau, tau as u64);
            assert!(calls <= tau, "compteur {calls} > τ {tau}");
            assert!(z_pos.is_subset(&x));
            assert!(z_neg.is_subset(&x));
            assert!(z_pos.is_disjoint(&z_neg));
            assert!(z_pos.iter().all(|e| y.contains(e)), "faux positif détecté");
            assert!(z_neg.iter().all(|e| !y.contains(e)), "faux négatif détecté");
        }
    }

    #[test]
    fn test_budget_nul() {
        let x: HashSet<u64> = (0..4).collect();
        let y: HashSet<u64> = (0..4).collect();
        let (z_pos, z_neg, calls) = run_counted(&x, &y, 0, 1);
        assert!(z_pos.is_empty() && z_neg.is_empty());
        assert_eq!(calls, 0);
    }
}
