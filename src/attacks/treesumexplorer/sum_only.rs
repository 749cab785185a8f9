// =========================================================
// Attaque améliorée n'exploitant QUE le canal somme de
// PSI-SUM, sur paires (identifiant, valeur).
//
// Même descente d'arbre que l'attaque de référence, mais la
// priorité d'un nœud est le rapport somme-fuite / somme
// totale de ses valeurs, et les deux extrêmes sont
// récompensés comme dans dynpathblizer. Un enfant de somme
// nulle part en Z⁻. Valeurs strictement positives attendues.
// =========================================================

use crate::partition::TreeNode;
use rand::Rng;
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};

type Pair = (u64, i64);

struct ForestEntry {
    priority: f64,
    sum: i64,
    idx: u64,
    node: TreeNode<Pair>,
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
        // min-tas sur (priority, sum, idx)
        other
            .priority
            .partial_cmp(&self.priority)
            .unwrap_or(Ordering::Equal)
            .then_with(|| other.sum.cmp(&self.sum))
            .then_with(|| other.idx.cmp(&self.idx))
    }
}

fn total_of(set: &HashSet<Pair>) -> i64 {
    set.iter().map(|pair| pair.1).sum()
}

fn pushed_priority(sum: i64, total: i64) -> f64 {
    let ratio = sum as f64 / total as f64;
    (-ratio).min(-1.0 + ratio)
}

/// Attaque par canal somme seul.
///
/// `psi_sum` rend (cardinal, somme) ; seul le second membre est exploité.
pub fn improved_attack_with_sum_only<F, R>(
    victim_x: &HashSet<Pair>,
    mut psi_sum: F,
    tau: usize,
    rng: &mut R,
) -> (HashSet<Pair>, HashSet<Pair>)
where
    F: FnMut(&HashSet<Pair>) -> (usize, i64),
    R: Rng,
{
    let mut z_pos: HashSet<Pair> = HashSet::new();
    let mut z_neg: HashSet<Pair> = HashSet::new();
    if tau == 0 || victim_x.is_empty() {
        return (z_pos, z_neg);
    }
    let total_sum = total_of(victim_x);
    if total_sum == 0 {
        return (z_pos, z_neg);
    }

    let mut forest: BinaryHeap<ForestEntry> = BinaryHeap::new();
    let mut idx: u64 = 0;

    let (_, current_sum) = psi_sum(victim_x);
    let mut protocol_call_num = 1usize;

    let tree = TreeNode::form_tree(victim_x, rng);
    forest.push(ForestEntry {
        priority: pushed_priority(current_sum, total_sum),
        sum: current_sum,
        idx,
        node: tree,
    });
    idx += 1;

    let mut exhausted = false;
    while !exhausted {
        let Some(entry) = forest.pop() else { break };
        let mut node = entry.node;
        let mut current_node_sum = entry.sum;
        let total_sum = total_of(&node.val);

        while 0 < current_node_sum && current_node_sum < total_sum {
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
            let left_node_total = total_of(&left_node.val);
            let right_node_total = total_of(&right_node.val);
            if left_node_total == 0 || right_node_total == 0 {
                break;
            }

            let (left_node_sum, right_node_sum);
            if right_node_total > left_node_total {
                let (_, s) = psi_sum(&left_node.val);
                protocol_call_num += 1;
                left_node_sum = s;
                right_node_sum = current_node_sum - s;
            } else {
                let (_, s) = psi_sum(&right_node.val);
                protocol_call_num += 1;
                right_node_sum = s;
                left_node_sum = current_node_sum - s;
            }

            let right_ratio = right_node_sum as f64 / right_node_total as f64;
            let left_ratio = left_node_sum as f64 / left_node_total as f64;
            let right_priority = right_ratio.max(1.0 - right_ratio);
            let left_priority = left_ratio.max(1.0 - left_ratio);

            if right_priority > left_priority {
                if left_node_sum != 0 {
                    forest.push(ForestEntry {
                        priority: pushed_priority(left_node_sum, left_node_total),
                        sum: left_node_sum,
                        idx,
                        node: left_node,
                    });
                    idx += 1;
                } else {
                    z_neg.extend(left_node.val);
                }
                node = right_node;
                current_node_sum = right_node_sum;
            } else {
                if right_node_sum != 0 {
                    forest.push(ForestEntry {
                        priority: pushed_priority(right_node_sum, right_node_total),
                        sum: right_node_sum,
                        idx,
                        node: right_node,
                    });
                    idx += 1;
                } else {
                    z_neg.extend(right_node.val);
                }
                node = left_node;
                current_node_sum = left_node_sum;
            }
        }

        if exhausted {
            break;
        }
        if current_node_sum > 0 {
            z_pos.extend(node.val);
        } else if current_node_sum == 0 {
            z_neg.extend(node.val);
        }
    }

    debug_assert!(
        z_pos.is_disjoint(&z_neg),
        "Z+ et Z- doivent être disjoints"
    );
    (z_pos, z_neg)
}
