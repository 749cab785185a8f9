// =========================================================
// Canal latéral PSI — les trois oracles consommés par les
// moteurs d'attaque.
//
// Ici l'« oracle » est un simple calcul d'intersection local :
// on n'implémente pas de protocole PSI de production, on
// modélise exactement ce que le protocole laisse fuiter
// (cardinal, intersection complète, ou cardinal + somme).
// Chaque appel coûte une unité du budget τ côté attaquant ;
// la comptabilité est tenue par les moteurs, pas ici.
// =========================================================

use std::collections::HashSet;
use std::hash::Hash;

/// PSI-CA : cardinal de l'intersection seulement.
pub fn psi_cardinality<T: Eq + Hash>(victim: &HashSet<T>, target: &HashSet<T>) -> usize {
    victim.intersection(target).count()
}

/// PSI complet : l'intersection elle-même.
pub fn psi<T: Eq + Hash + Clone>(victim: &HashSet<T>, target: &HashSet<T>) -> HashSet<T> {
    victim.intersection(target).cloned().collect()
}

/// PSI-SUM sur paires (identifiant, valeur) : cardinal et somme des valeurs
/// de l'intersection.
pub fn psi_sum(victim: &HashSet<(u64, i64)>, target: &HashSet<(u64, i64)>) -> (usize, i64) {
    let mut cardinality = 0usize;
    let mut summation = 0i64;
    for pair in victim.intersection(target) {
        cardinality += 1;
        summation += pair.1;
    }
    (cardinality, summation)
}

/// Variante PSI-SUM pour vecteurs d'entiers : les éléments sont leur propre
/// valeur.
pub fn psi_sum_int(victim: &HashSet<i64>, target: &HashSet<i64>) -> (usize, i64) {
    let mut cardinality = 0usize;
    let mut summation = 0i64;
    for v in victim.intersection(target) {
        cardinality += 1;
        summation += v;
    }
    (cardinality, summation)
}
