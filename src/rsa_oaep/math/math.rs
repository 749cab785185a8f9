use crate::crypto_error::crypto_error::CryptoError;
use num_bigint::{BigInt, BigUint, RandBigInt};
use num_integer::Integer;
use num_traits::{One, ToPrimitive, Zero};
use rand_core::OsRng;
use rand_core::RngCore;

// Taille minimale de module RSA acceptée (deux facteurs de 256 bits) :
// en dessous, même l'en-tête OAEP ne tient pas dans un bloc
pub const MIN_MODULUS_BITS: u64 = 512;

// Le crible compare les candidats aux petits premiers par simple reste :
// il suppose donc des candidats très au-delà de la table. On refuse de
// générer des premiers minuscules plutôt que de gérer la collision d'un
// candidat avec un premier de la table.
const MIN_PRIME_BITS: u64 = 32;

// ---------------------------------------------------------------------------
// Petits premiers impairs jusqu'à 997, pour le crible des candidats
// ---------------------------------------------------------------------------
const SMALL_PRIMES: &[u64] = &[
      3,   5,   7,  11,  13,  17,  19,  23,  29,  31,
     37,  41,  43,  47,  53,  59,  61,  67,  71,  73,
     79,  83,  89,  97, 101, 103, 107, 109, 113, 127,
    131, 137, 139, 149, 151, 157, 163, 167, 173, 179,
    181, 191, 193, 197, 199, 211, 223, 227, 229, 233,
    239, 241, 251, 257, 263, 269, 271, 277, 281, 283,
    293, 307, 311, 313, 317, 331, 337, 347, 349, 353,
    359, 367, 373, 379, 383, 389, 397, 401, 409, 419,
    421, 431, 433, 439, 443, 449, 457, 461, 463, 467,
    479, 487, 491, 499, 503, 509, 521, 523, 541, 547,
    557, 563, 569, 571, 577, 587, 593, 599, 601, 607,
    613, 617, 619, 631, 641, 643, 647, 653, 659, 661,
    673, 677, 683, 691, 701, 709, 719, 727, 733, 739,
    743, 751, 757, 761, 769, 773, 787, 797, 809, 811,
    821, 823, 827, 829, 839, 853, 857, 859, 863, 877,
    881, 883, 887, 907, 911, 919, 929, 937, 941, 947,
    953, 967, 971, 977, 983, 991, 997,
];

// ---------------------------------------------------------------------------
// Nombre de tours Miller-Rabin selon la taille du candidat.
//
// L'erreur est bornée par 4^(-tours), et les candidats aléatoires de
// grande taille ont une proportion de menteurs forts bien moindre que la
// borne générique : on relâche donc le nombre de tours quand la taille
// monte, aux profils usuels des facteurs RSA.
// ---------------------------------------------------------------------------
fn miller_rabin_rounds(nbits: u64) -> u32 {
    match nbits {
        0..=255 => 20,
        256..=511 => 12,
        512..=1023 => 8,
        _ => 4,
    }
}

// Crible : reste non nul contre chaque premier de la table
fn survives_sieve(candidate: &BigUint) -> bool {
    SMALL_PRIMES.iter().all(|&p| !(candidate % p).is_zero())
}

// ---------------------------------------------------------------------------
// Test de primalité.
//
// Tout ce qui tient en u64 est tranché exactement par division d'essai
// (le chemin des tests et des petites entrées) ; au-delà, Miller-Rabin
// à témoins aléatoires.
// ---------------------------------------------------------------------------
pub fn is_probable_prime(n: &BigUint, rounds: u32, rng: &mut impl RngCore) -> bool {
    if let Some(small) = n.to_u64() {
        return is_small_prime(small);
    }
    if n.is_even() {
        return false;
    }

    // n − 1 = impair · 2^s
    let n_minus_1 = n - BigUint::one();
    let s = n_minus_1.trailing_zeros().unwrap_or(0);
    let odd_part = &n_minus_1 >> s;

    let low = BigUint::from(2u32);
    for _ in 0..rounds {
        let base = rng.gen_biguint_range(&low, &n_minus_1);
        if witnesses_composite(&base, &odd_part, s, n, &n_minus_1) {
            return false;
        }
    }
    true
}

// Division d'essai exacte sur u64
fn is_small_prime(n: u64) -> bool {
    if n < 4 {
        return n >= 2;
    }
    if n % 2 == 0 {
        return false;
    }
    let mut divisor = 3u64;
    while divisor.saturating_mul(divisor) <= n {
        if n % divisor == 0 {
            return false;
        }
        divisor += 2;
    }
    true
}

// Rend true si `base` établit que n est composé (témoin de Miller-Rabin) :
// base^impair ≠ ±1, et aucun des s−1 carrés successifs n'atteint −1
fn witnesses_composite(
    base: &BigUint,
    odd_part: &BigUint,
    s: u64,
    n: &BigUint,
    n_minus_1: &BigUint,
) -> bool {
    let mut x = base.modpow(odd_part, n);
    if x.is_one() || &x == n_minus_1 {
        return false;
    }
    for _ in 1..s {
        x = (&x * &x) % n;
        if &x == n_minus_1 {
            return false;
        }
    }
    true
}

// ---------------------------------------------------------------------------
// Génération d'un premier probable de nbits bits exactement.
//
// Les deux bits de poids fort sont forcés à 1 : le produit de deux premiers
// de nbits bits a ainsi toujours exactement 2*nbits bits, ce qui fixe la
// taille de bloc OAEP. Le bit 0 force l'imparité.
// ---------------------------------------------------------------------------
pub fn generate_prime(nbits: u64) -> Result<BigUint, CryptoError> {
    if nbits < MIN_PRIME_BITS {
        return Err(CryptoError::KeySizeTooSmall {
            requested: nbits,
            minimum: MIN_PRIME_BITS,
        });
    }

    let mut rng = OsRng;
    let rounds = miller_rabin_rounds(nbits);

    loop {
        let mut candidate = rng.gen_biguint(nbits);
        candidate.set_bit(nbits - 1, true);
        candidate.set_bit(nbits - 2, true);
        candidate.set_bit(0, true);

        // Le crible écarte à bas coût la masse des composés avant de payer
        // les exponentiations de Miller-Rabin
        if !survives_sieve(&candidate) {
            continue;
        }

        if is_probable_prime(&candidate, rounds, &mut rng) {
            debug_assert_eq!(
                candidate.bits(),
                nbits,
                "le candidat devrait avoir {} bits, en a {}",
                nbits,
                candidate.bits()
            );
            return Ok(candidate);
        }
    }
}

// ---------------------------------------------------------------------------
// Inverse modulaire de a mod n, par Euclide étendu en ne suivant que le
// coefficient de Bézout utile (celui de a). Sert à d = e⁻¹ mod λ(n).
// Retourne Err(CryptoError::NoModularInverse) si gcd(a, n) != 1.
// ---------------------------------------------------------------------------
pub fn mod_inverse(a: &BigUint, n: &BigUint) -> Result<BigUint, CryptoError> {
    let modulus = BigInt::from(n.clone());
    let mut remainder = BigInt::from(a.clone());
    let mut divisor = modulus.clone();
    let mut coeff = BigInt::one();
    let mut next_coeff = BigInt::zero();

    // Invariant : remainder ≡ coeff · a (mod n), divisor ≡ next_coeff · a
    while !divisor.is_zero() {
        let quotient = &remainder / &divisor;
        let new_remainder = &remainder - &quotient * &divisor;
        remainder = std::mem::replace(&mut divisor, new_remainder);
        let new_coeff = &coeff - &quotient * &next_coeff;
        coeff = std::mem::replace(&mut next_coeff, new_coeff);
    }

    // remainder porte maintenant gcd(a, n)
    if !remainder.is_one() {
        return Err(CryptoError::NoModularInverse);
    }

    let reduced = ((coeff % &modulus) + &modulus) % &modulus;
    reduced.to_biguint().ok_or(CryptoError::NegativeConversion)
}

// ============================================================================
// Tests unitaires
// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mod_inverse() {
        let a = BigUint::from(3u32);
        let n = BigUint::from(11u32);
        let inv = mod_inverse(&a, &n).unwrap();
        assert_eq!((a * inv) % n, BigUint::one());
    }

    #[test]
    fn test_mod_inverse_grand_module() {
        // e = 65537 inversé modulo un λ de taille réaliste
        let e = BigUint::from(65537u32);
        let lambda = (BigUint::one() << 512u32) - BigUint::from(569u32);
        let d = mod_inverse(&e, &lambda).unwrap();
        assert_eq!((e * d) % lambda, BigUint::one());
    }

    #[test]
    fn test_mod_inverse_inexistant() {
        let a = BigUint::from(4u32);
        let n = BigUint::from(8u32);
        assert_eq!(mod_inverse(&a, &n), Err(CryptoError::NoModularInverse));
    }

    #[test]
    fn test_primalite_petits_cas() {
        let mut rng = OsRng;
        for p in [2u32, 3, 5, 101, 997, 104729] {
            assert!(is_probable_prime(&BigUint::from(p), 10, &mut rng), "{p}");
        }
        for c in [0u32, 1, 4, 100, 104730, 997 * 991] {
            assert!(!is_probable_prime(&BigUint::from(c), 10, &mut rng), "{c}");
        }
    }

    #[test]
    fn test_primalite_au_dela_de_u64() {
        let mut rng = OsRng;
        // M89 = 2^89 − 1 est premier, M67 = 2^67 − 1 est composé
        let m89 = (BigUint::one() << 89u32) - BigUint::one();
        let m67 = (BigUint::one() << 67u32) - BigUint::one();
        assert!(is_probable_prime(&m89, 20, &mut rng));
        assert!(!is_probable_prime(&m67, 20, &mut rng));
    }

    #[test]
    fn test_generate_prime_taille_exacte() {
        let p = generate_prime(96).unwrap();
        assert_eq!(p.bits(), 96);
        assert!(p.is_odd());
    }

    #[test]
    fn test_generate_prime_trop_petit_refuse() {
        assert!(matches!(
            generate_prime(16),
            Err(CryptoError::KeySizeTooSmall { .. })
        ));
    }
}
