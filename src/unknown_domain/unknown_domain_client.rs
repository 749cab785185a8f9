// =========================================================
// Client du volet « domaine inconnu » — double chiffrement.
//
// Pour chaque message : chiffré interne RSA-OAEP sous la clé
// du serveur, puis chiffré externe sous la clé du serveur
// auxiliaire portant (chiffré_interne ∥ SHA256(message)).
// Le suffixe de 32 octets permet au serveur auxiliaire de
// grouper les occurrences d'un même message sans jamais voir
// le clair.
// =========================================================

use crate::crypto_error::CryptoError;
use crate::rsa_oaep::r_encrypt::r_encrypt::r_encrypt;
use crate::rsa_oaep::r_keygen::PublicKey;
use sha2::{Digest, Sha256};

/// Algorithme embarqué : rend les chiffrés externes.
///
/// `pk1` est la clé du serveur, `pk2` celle du serveur auxiliaire. Le module
/// de `pk2` doit laisser passer un bloc de taille(pk1) + 32 octets.
pub fn on_device_algorithm(
    d: &[String],
    pk1: &PublicKey,
    pk2: &PublicKey,
) -> Result<Vec<Vec<u8>>, CryptoError> {
    let mut encrypted_messages = Vec::with_capacity(d.len());
    for message in d {
        let hash_message = Sha256::digest(message.as_bytes());

        let ciphertext_with_pk1 = r_encrypt(message.as_bytes(), pk1)?;
        let mut inner_and_hash = ciphertext_with_pk1;
        inner_and_hash.extend_from_slice(&hash_message);

        let ciphertext_with_pk2 = r_encrypt(&inner_and_hash, pk2)?;
        encrypted_messages.push(ciphertext_with_pk2);
    }
    Ok(encrypted_messages)
}
