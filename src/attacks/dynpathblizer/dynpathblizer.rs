// =========================================================
// Dynpathblizer — attaque MIA guidée par programmation
// dynamique.
//
// Deux différences avec l'attaque de référence :
//
//   1. La priorité d'un nœud est min(−c/n, −1 + c/n) : un
//      sous-ensemble presque vide est aussi informatif qu'un
//      sous-ensemble presque plein, les deux extrêmes sont
//      récompensés.
//   2. Le facteur de partition k vient des tables (γ, φ) :
//      si φ(n, c) < budget restant, une coupe équilibrée n/2
//      suffit ; sinon on prend le k* optimal de γ(n, c, τ_restant).
//      (Le sens strict de la comparaison suit l'algorithme
//      publié : à égalité exacte, le k* du mémo est retenu.)
//
// Pas d'arbre pré-construit ici : la partition est retirée
// par mélange + préfixe de taille k à chaque étage.
// Un k dégénéré (0 ou n) interrompt la descente du nœud, la
// boucle externe continue.
// =========================================================

use super::dynpathblizer_params::LeakageMemo;
use rand::seq::SliceRandom;
use rand::Rng;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use std::hash::Hash;

struct ForestEntry<T> {
    priority: f64,
    cardinality: usize,
    idx: u64,
    node: HashSet<T>,
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
        // min-tas sur (priority, cardinality, idx), cf. baseline.rs
        other
            .priority
            .partial_cmp(&self.priority)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.cardinality.cmp(&self.cardinality))
            .then_with(|| other.idx.cmp(&self.idx))
    }
}

// Priorité d'insertion : plus c'est proche d'un extrême, plus c'est négatif
fn pushed_priority(cardinality: usize, len: usize) -> f64 {
    let density = cardinality as f64 / len as f64;
    (-density).min(-1.0 + density)
}

/// Attaque DP-guidée sur PSI-CA.
///
/// `memo` doit avoir été construit avec `n_max >= |X|` ; une lecture hors
/// mémo est fatale (incohérence construction/usage).
/// Retourne (Z⁺, Z⁻) disjoints, Z⁺ émis quand c == n, Z⁻ quand c == 0.
pub fn dynpathblizer<T, F, R>(
    victim_x: &HashSet<T>,
    mut psi_ca: F,
    tau: usize,
    memo: &LeakageMemo,
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

    forest.push(ForestEntry {
        priority: pushed_priority(initial_node_cardinality, victim_x.len()),
        cardinality: initial_node_cardinality,
        idx,
        node: victim_x.clone(),
    });
    idx += 1;

    while let Some(entry) = forest.pop() {
        let mut node = entry.node;
        let mut current_node_cardinality = entry.cardinality;

        while 0 < current_node_cardinality
            && current_node_cardinality < node.len()
            && protocol_call_num < tau
        {
            let n_node = node.len();
            let max_call_num = memo.phi(n_node, current_node_cardinality);
            let remaining = tau - protocol_call_num;
            let partition_factor_k = if max_call_num < remaining {
                n_node / 2
            } else {
                memo.gamma(n_node, current_node_cardinality, remaining).1
            };
            if partition_factor_k == 0 || partition_factor_k == n_node {
                break;
            }

            // Sous-ensemble aléatoire de taille k : mélange + préfixe
            let mut cur_node: Vec<T> = node.iter().cloned().collect();
            cur_node.shuffle(rng);
            let left_node: HashSet<T> = cur_node[..partition_factor_k].iter().cloned().collect();
            let right_node: HashSet<T> = cur_node[partition_factor_k..].iter().cloned().collect();

            let (left_cardinality, right_cardinality);
            if right_node.len() > left_node.len() {
                left_cardinality = psi_ca(&left_node);
                protocol_call_num += 1;
                right_cardinality = current_node_cardinality - left_cardinality;
            } else {
                right_cardinality = psi_ca(&right_node);
                protocol_call_num += 1;
                left_cardinality = current_node_cardinality - right_cardinality;
            }

            // Les deux extrêmes de densité sont également informatifs
            let right_density = right_cardinality as f64 / right_node.len() as f64;
            let left_density = left_cardinality as f64 / left_node.len() as f64;
            let right_priority = right_density.max(1.0 - right_density);
            let left_priority = left_density.max(1.0 - left_density);

            if right_priority > left_priority {
                if left_cardinality != 0 {
                    forest.push(ForestEntry {
                        priority: pushed_priority(left_cardinality, left_node.len()),
                        cardinality: left_cardinality,
                        idx,
                        node: left_node,
                    });
                    idx += 1;
                } else {
                    z_neg.extend(left_node);
                }
                node = right_node;
                current_node_cardinality = right_cardinality;
            } else {
                if right_cardinality != 0 {
                    forest.push(ForestEntry {
                        priority: pushed_priority(right_cardinality, right_node.len()),
                        cardinality: right_cardinality,
                        idx,
                        node: right_node,
                    });
                    idx += 1;
                } else {
                    z_neg.extend(right_node);
                }
                node = left_node;
                current_node_cardinality = left_cardinality;
            }
        }

        if current_node_cardinality == node.len() {
            z_pos.extend(node);
        } else if current_node_cardinality == 0 {
            z_neg.extend(node);
        }
        // Nœud mixte à budget épuisé : indéterminé, on draine la file
        // pour récolter les nœuds déjà résolus
    }

    debug_assert!(
        z_pos.is_disjoint(&z_neg),
        "Z+ et Z- doivent être disjoints"
    );
    (z_pos, z_neg)
}
