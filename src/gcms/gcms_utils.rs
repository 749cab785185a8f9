// =========================================================
// Utilitaires du cadre GCMS (General Count Mean Sketch).
//
// L'encodage de seau doit être identique au bit près entre
// client et serveur : graine de hachage exactement
// `message ∥ "$$$" ∥ indice décimal` en UTF-8, digest
// SHA-256, seau = entier(digest) mod m. Le digest complet
// (256 bits) passe par BigUint pour que la réduction soit
// correcte même quand m n'est pas une puissance de deux.
// =========================================================

use num_bigint::BigUint;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Paramètres du mécanisme GCMS.
///
/// * `k` : nombre de fonctions de hachage.
/// * `m` : taille de la plage des seaux.
/// * `s` : taille du payload de chaque message.
/// * `p` : probabilité d'inclusion du vrai seau.
#[derive(Debug, Clone, Copy)]
pub struct GcmsParams {
    pub k: usize,
    pub m: usize,
    pub s: usize,
    pub p: f64,
}

impl GcmsParams {
    /// Budget de confidentialité dérivé : ε = ln((m−s)·p / ((1−p)·s)).
    pub fn epsilon(&self) -> f64 {
        ((self.m - self.s) as f64 * self.p / ((1.0 - self.p) * self.s as f64)).ln()
    }
}

/// Hache `message` avec la fonction d'indice `index`, réduit modulo `module`.
pub fn hash_encode(message: &str, index: usize, module: usize) -> usize {
    let mut hasher = Sha256::new();
    hasher.update(message.as_bytes());
    hasher.update(b"$$$");
    hasher.update(index.to_string().as_bytes());
    let digest = hasher.finalize();
    let value = BigUint::from_bytes_be(&digest);
    let reduced = value % (module as u64);
    // reduced < module <= u64::MAX : un seul digit en base 2^64
    reduced.to_u64_digits().first().copied().unwrap_or(0) as usize
}

/// Tirage de Bernoulli de paramètre `p` sur le RNG fourni.
pub fn bernoulli_sample<R: Rng>(p: f64, rng: &mut R) -> bool {
    rng.gen_range(0..1_000_000u32) < (p * 1_000_000.0) as u32
}

/// Nombre d'octets nécessaires pour représenter `value` (⌈bits/8⌉).
pub fn byte_length(value: usize) -> usize {
    let bits = (usize::BITS - value.leading_zeros()) as usize;
    bits.div_ceil(8)
}

/// Sérialise des entiers en big-endian, chacun sur `fixed_length` octets.
pub fn serialize_integers_to_bytes(integers: &[usize], fixed_length: usize) -> Vec<u8> {
    let mut serialized_data = Vec::with_capacity(integers.len() * fixed_length);
    for &num in integers {
        let bytes = (num as u64).to_be_bytes();
        serialized_data.extend_from_slice(&bytes[8 - fixed_length..]);
    }
    serialized_data
}

/// Désérialise des entiers big-endian de largeur fixe.
pub fn deserialize_integers_from_bytes(serialized_data: &[u8], fixed_length: usize) -> Vec<usize> {
    serialized_data
        .chunks_exact(fixed_length)
        .map(|chunk| chunk.iter().fold(0usize, |acc, &b| (acc << 8) | b as usize))
        .collect()
}

/// Bruit de Laplace(loc, scale) par inversion de la fonction de répartition.
/// Usage expérimental : pour une production DP il faudrait un échantillonneur
/// en précision contrôlée.
pub fn generate_laplace_noise<R: Rng>(loc: f64, scale: f64, rng: &mut R) -> f64 {
    let u: f64 = rng.gen::<f64>() - 0.5;
    loc - scale * u.signum() * (1.0 - 2.0 * u.abs()).ln()
}
