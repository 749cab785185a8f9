// =========================================================
// Variante améliorée de l'attaque de référence.
//
// Même squelette que baseline.rs, avec une différence : un
// enfant dont le cardinal égale sa taille (entièrement dans
// Y, information déjà acquise par soustraction) est versé
// immédiatement dans Z⁺ au lieu de retourner dans la forêt.
// Symétrique du traitement des enfants vides versés dans Z⁻.
// Sous budget serré, cela capture des fuites que la version
// de référence laisse mourir dans la file.
// =========================================================

use super::baseline::ForestEntry;
use crate::partition::TreeNode;
use rand::Rng;
use std::collections::{BinaryHeap, HashSet};
use std::hash::Hash;

/// Attaque de référence améliorée sur PSI-CA.
///
/// Même contrat que `baseline_attack_with_limited_call`.
pub fn improved_baseline_attack_with_limited_call<T, F, R>(
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

            let right_priority = right_cardinality as f64 / right_node.val.len() as f64;
            let left_priority = left_cardinality as f64 / left_node.val.len() as f64;
            if right_priority > left_priority {
                // Émission immédiate des enfants déjà déterminés (vides OU pleins)
                if left_cardinality == 0 {
                    z_neg.extend(left_node.val);
                } else if left_cardinality == left_node.val.len() {
                    z_pos.extend(left_node.val);
                } else {
                    forest.push(ForestEntry {
                        priority: -(left_cardinality as f64) / left_node.val.len() as f64,
                        cardinality: left_cardinality,
                        idx,
                        node: left_node,
                    });
                    idx += 1;
                }
                node = right_node;
                current_node_cardinality = right_cardinality;
            } else {
                if right_cardinality == 0 {
                    z_neg.extend(right_node.val);
                } else if right_cardinality == right_node.val.len() {
                    z_pos.extend(right_node.val);
                } else {
                    forest.push(ForestEntry {
                        priority: -(right_cardinality as f64) / right_node.val.len() as f64,
                        cardinality: right_cardinality,
                        idx,
                        node: right_node,
                    });
                    idx += 1;
                }
                node = left_node;
                current_node_cardinality = left_cardinality;
            }
        }

        if exhausted {
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
