// =========================================================
// Arbre de partition — bissection récursive uniforme de
// l'ensemble victime X.
//
// Chaque nœud possède un ensemble `val` ; les `val` des deux
// enfants sont disjoints et leur union redonne le parent.
// Les feuilles sont des singletons. La coupe se fait après
// mélange uniforme, à ⌊n/2⌋. Un arbre est à usage unique :
// sa durée de vie est celle de l'invocation d'attaque qui
// l'a construit, et la racine possède exclusivement ses
// sous-arbres (Box).
// =========================================================

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::hash::Hash;

pub struct TreeNode<T> {
    pub val: HashSet<T>,
    pub left: Option<Box<TreeNode<T>>>,
    pub right: Option<Box<TreeNode<T>>>,
}

impl<T: Clone + Eq + Hash> TreeNode<T> {
    /// Construit l'arbre de partition de `input_set`.
    ///
    /// Le RNG est injecté par l'appelant : un StdRng avec graine fixe rend
    /// la partition reproductible en test.
    pub fn form_tree<R: Rng>(input_set: &HashSet<T>, rng: &mut R) -> TreeNode<T> {
        let mut cur_node = TreeNode {
            val: input_set.clone(),
            left: None,
            right: None,
        };
        if input_set.len() <= 1 {
            return cur_node;
        }

        let mut cur_node_list: Vec<T> = input_set.iter().cloned().collect();
        cur_node_list.shuffle(rng);
        let half = cur_node_list.len() / 2;
        let left_set: HashSet<T> = cur_node_list[..half].iter().cloned().collect();
        let right_set: HashSet<T> = cur_node_list[half..].iter().cloned().collect();

        cur_node.left = Some(Box::new(Self::form_tree(&left_set, rng)));
        cur_node.right = Some(Box::new(Self::form_tree(&right_set, rng)));
        cur_node
    }
}
