use crate::crypto_error::CryptoError;
use crate::rsa_oaep::oaep::{i2osp, oaep_encode};
use crate::rsa_oaep::r_keygen::{modulus_byte_length, PublicKey};
use num_bigint::BigUint;

// ---------------------------------------------------------------------------
// Chiffrement RSA-OAEP : c = OS2IP(EM)^e mod n
//
// Le chiffré fait toujours exactement la taille du module.
// Retourne Err(CryptoError::MessageTooLong) si le message ne tient pas
// dans un bloc OAEP (k − 2·hLen − 2 octets).
// ---------------------------------------------------------------------------
pub fn r_encrypt(message: &[u8], pk: &PublicKey) -> Result<Vec<u8>, CryptoError> {
    let k = modulus_byte_length(pk);
    let em = oaep_encode(message, k)?;

    // L'octet de tête nul de EM garantit m < n
    let m_int = BigUint::from_bytes_be(&em);
    let c = m_int.modpow(&pk.e, &pk.n);

    Ok(i2osp(&c, k))
}
