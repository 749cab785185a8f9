use crate::crypto_error::CryptoError;
use crate::rsa_oaep::oaep::{i2osp, oaep_decode};
use crate::rsa_oaep::r_keygen::{modulus_byte_length, PublicKey, SecretKey};
use num_bigint::BigUint;

// ---------------------------------------------------------------------------
// Déchiffrement RSA-OAEP : EM = I2OSP(c^d mod n), puis décodage EME-OAEP.
//
// Retourne Err(CryptoError::CiphertextOutOfRange) si le chiffré n'a pas la
// taille du module ou représente un entier >= n, et
// Err(CryptoError::OaepDecodeFailed) (opaque) pour tout bloc invalide.
// ---------------------------------------------------------------------------
pub fn r_decrypt(
    ciphertext: &[u8],
    pk: &PublicKey,
    sk: &SecretKey,
) -> Result<Vec<u8>, CryptoError> {
    let k = modulus_byte_length(pk);
    if ciphertext.len() != k {
        return Err(CryptoError::CiphertextOutOfRange);
    }

    let c = BigUint::from_bytes_be(ciphertext);
    if c >= pk.n {
        return Err(CryptoError::CiphertextOutOfRange);
    }

    let m = c.modpow(&sk.d, &pk.n);
    let em = i2osp(&m, k);

    oaep_decode(&em, k)
}

// ============================================================================
// Tests unitaires
// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::rsa_oaep::r_encrypt::r_encrypt::r_encrypt;
    use crate::rsa_oaep::r_keygen::r_keygen::r_keygen;

    // 768 bits : le plus petit module confortable pour les messages de test
    // (bloc OAEP de 96 octets, 30 octets utiles)

    #[test]
    fn test_chiffrement_dechiffrement() {
        let kp = r_keygen(768).unwrap();
        let message = b"payload GCMS";
        let c = r_encrypt(message, &kp.public_key).unwrap();
        assert_eq!(c.len(), 96);
        let decrypted = r_decrypt(&c, &kp.public_key, &kp.secret_key).unwrap();
        assert_eq!(decrypted, message);
    }

    #[test]
    fn test_chiffrement_probabiliste() {
        // Deux chiffrés du même message diffèrent (graine OAEP fraîche)
        let kp = r_keygen(768).unwrap();
        let c1 = r_encrypt(b"m", &kp.public_key).unwrap();
        let c2 = r_encrypt(b"m", &kp.public_key).unwrap();
        assert_ne!(c1, c2);
        assert_eq!(
            r_decrypt(&c1, &kp.public_key, &kp.secret_key).unwrap(),
            r_decrypt(&c2, &kp.public_key, &kp.secret_key).unwrap()
        );
    }

    #[test]
    fn test_message_trop_long_refuse() {
        let kp = r_keygen(768).unwrap();
        let message = vec![0u8; 31];
        assert!(matches!(
            r_encrypt(&message, &kp.public_key),
            Err(CryptoError::MessageTooLong { .. })
        ));
    }

    #[test]
    fn test_chiffre_altere_refuse() {
        let kp = r_keygen(768).unwrap();
        let mut c = r_encrypt(b"secret", &kp.public_key).unwrap();
        c[10] ^= 0x01;
        assert_eq!(
            r_decrypt(&c, &kp.public_key, &kp.secret_key),
            Err(CryptoError::OaepDecodeFailed)
        );
    }

    #[test]
    fn test_taille_de_chiffre_invalide() {
        let kp = r_keygen(768).unwrap();
        assert_eq!(
            r_decrypt(&[0u8; 95], &kp.public_key, &kp.secret_key),
            Err(CryptoError::CiphertextOutOfRange)
        );
    }
}
