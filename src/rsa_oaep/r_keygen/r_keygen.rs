use crate::crypto_error::crypto_error::CryptoError;
use crate::rsa_oaep::math::{generate_prime, mod_inverse, MIN_MODULUS_BITS};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::One;
use zeroize::Zeroize;

// ============================================================================
// Clé publique RSA — pas de données secrètes, pas de zeroize nécessaire
// ============================================================================
#[derive(Clone, Debug)]
pub struct PublicKey {
    pub n: BigUint,
    pub e: BigUint,
}

/// Taille du module en octets : c'est la taille de bloc OAEP et la longueur
/// exacte de tout chiffré produit sous cette clé.
pub fn modulus_byte_length(pk: &PublicKey) -> usize {
    ((pk.n.bits() + 7) / 8) as usize
}

// ============================================================================
// Helper : efface les octets internes d'un BigUint
// ============================================================================
fn zeroize_biguint(n: &mut BigUint) {
    let bits = n.bits() as usize;
    if bits > 0 {
        *n = BigUint::from_bytes_be(&vec![0u8; (bits + 7) / 8]);
    }
    *n = BigUint::default();
}

// ============================================================================
// Clé secrète RSA — ZEROISÉE À LA DESTRUCTION
// ============================================================================
#[derive(Clone, Debug)]
pub struct SecretKey {
    pub d: BigUint,
    pub p: BigUint,
    pub q: BigUint,
}

impl Zeroize for SecretKey {
    fn zeroize(&mut self) {
        zeroize_biguint(&mut self.d);
        zeroize_biguint(&mut self.p);
        zeroize_biguint(&mut self.q);
    }
}

impl Drop for SecretKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

// ============================================================================
// Paire de clés
// ============================================================================
#[derive(Clone, Debug)]
pub struct KeyPair {
    pub public_key: PublicKey,
    pub secret_key: SecretKey,
}

// ============================================================================
// Génération de clés RSA
//
// e = 65537 fixe ; d = e⁻¹ mod λ(n) avec λ(n) = lcm(p−1, q−1).
// Les premiers ont leurs deux bits de poids fort à 1 : n fait exactement
// nbits bits et la taille de bloc OAEP est stable.
// ============================================================================
pub fn r_keygen(nbits: u64) -> Result<KeyPair, CryptoError> {
    if nbits < MIN_MODULUS_BITS {
        return Err(CryptoError::KeySizeTooSmall {
            requested: nbits,
            minimum: MIN_MODULUS_BITS,
        });
    }

    let e = BigUint::from(65537u32);
    let half = nbits / 2;

    loop {
        let p = generate_prime(half)?;
        let mut q = generate_prime(half)?;
        while p == q {
            q = generate_prime(half)?;
        }

        let n = &p * &q;
        let p_minus_1 = &p - BigUint::one();
        let q_minus_1 = &q - BigUint::one();
        let lambda = p_minus_1.lcm(&q_minus_1);

        // e doit être inversible mod λ(n) ; sinon on retire des premiers
        if e.gcd(&lambda) != BigUint::one() {
            continue;
        }
        let d = mod_inverse(&e, &lambda)?;

        return Ok(KeyPair {
            public_key: PublicKey { n, e },
            secret_key: SecretKey { d, p, q },
        });
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keygen_coherence() {
        let kp = r_keygen(512).unwrap();
        assert_eq!(kp.public_key.n.bits(), 512);
        assert_eq!(modulus_byte_length(&kp.public_key), 64);
        assert_eq!(&kp.secret_key.p * &kp.secret_key.q, kp.public_key.n);

        // e·d ≡ 1 mod λ(n)
        let lambda =
            (&kp.secret_key.p - BigUint::one()).lcm(&(&kp.secret_key.q - BigUint::one()));
        assert_eq!(
            (&kp.public_key.e * &kp.secret_key.d) % &lambda,
            BigUint::one()
        );
    }

    #[test]
    fn test_keygen_taille_refusee() {
        assert!(matches!(
            r_keygen(128),
            Err(CryptoError::KeySizeTooSmall { .. })
        ));
    }

    #[test]
    fn test_zeroize_efface_la_cle() {
        let mut sk = SecretKey {
            d: BigUint::from(12345u32),
            p: BigUint::from(7u32),
            q: BigUint::from(11u32),
        };
        sk.zeroize();
        assert_eq!(sk.d, BigUint::default());
        assert_eq!(sk.p, BigUint::default());
        assert_eq!(sk.q, BigUint::default());
    }
}
