// =========================================================
// Mélangeur — permutation uniforme des messages chiffrés.
//
// Fisher-Yates piloté par OsRng (CSPRNG) : l'anonymisation
// repose entièrement sur l'uniformité de la permutation,
// aucune autre transformation n'est appliquée.
// =========================================================

use rand::Rng;
use rand_core::OsRng;

/// Rend une copie mélangée de `data`.
pub fn shuffle<T: Clone>(data: &[T]) -> Vec<T> {
    let mut data_copy: Vec<T> = data.to_vec();
    let mut rng = OsRng;
    for i in (1..data_copy.len()).rev() {
        let j = rng.gen_range(0..=i);
        data_copy.swap(i, j);
    }
    data_copy
}

// ============================================================================
// Tests unitaires
// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conservation_du_multiensemble() {
        let data: Vec<u32> = (0..100).collect();
        let mut shuffled = shuffle(&data);
        shuffled.sort_unstable();
        assert_eq!(shuffled, data);
    }

    #[test]
    fn test_uniformite_chi_deux() {
        // Les 24 permutations de 4 éléments doivent être équiprobables.
        // Seuil χ² à 23 degrés de liberté, p ≈ 2e-5 : un faux positif
        // est pratiquement exclu.
        let n_trials = 24_000usize;
        let expected = n_trials as f64 / 24.0;

        let mut counts = std::collections::HashMap::new();
        for _ in 0..n_trials {
            let perm = shuffle(&[0u8, 1, 2, 3]);
            *counts.entry(perm).or_insert(0usize) += 1;
        }
        assert_eq!(counts.len(), 24, "permutation jamais produite");

        let chi2: f64 = counts
            .values()
            .map(|&c| {
                let d = c as f64 - expected;
                d * d / expected
            })
            .sum();
        assert!(chi2 < 60.0, "χ² = {chi2} : permutation non uniforme");
    }

    #[test]
    fn test_entrees_degenerees() {
        assert!(shuffle::<u8>(&[]).is_empty());
        assert_eq!(shuffle(&[7u8]), vec![7]);
    }
}
