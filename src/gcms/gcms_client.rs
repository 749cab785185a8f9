// =========================================================
// Client GCMS — randomisation locale (LDP) puis chiffrement.
//
// Pour chaque message d_i non manquant :
//   1. tirer uniformément une fonction de hachage j ∈ [0,k) ;
//   2. r = SHA256(d_i ∥ "$$$" ∥ j) mod m ;
//   3. avec probabilité p, payload = {r} ∪ (s−1 tirages
//      distincts dans [m] \ {r}) ; sinon s tirages distincts
//      dans [m] \ {r} ;
//   4. sérialiser le payload en big-endian à largeur fixe,
//      concaténer j, chiffrer en RSA-OAEP sous la clé
//      publique du serveur.
//
// Tout l'aléa de cette phase passe par OsRng : la
// randomisation fait partie de la garantie de
// confidentialité, un PRNG ordinaire n'y a pas sa place.
// =========================================================

use crate::crypto_error::CryptoError;
use crate::gcms::gcms_utils::{bernoulli_sample, byte_length, hash_encode, serialize_integers_to_bytes};
use crate::rsa_oaep::r_encrypt::r_encrypt::r_encrypt;
use crate::rsa_oaep::r_keygen::PublicKey;
use rand::Rng;
use rand_core::OsRng;

/// Sortie du client : les chiffrés, plus l'état pré-chiffrement
/// (indices et payloads en clair) conservé à des fins de recoupement.
pub struct ClientBatch {
    pub encrypted_messages: Vec<Vec<u8>>,
    pub hash_indexes: Vec<usize>,
    pub plaintext_messages: Vec<Vec<usize>>,
}

/// Randomisation d'un seul message : indice de hachage tiré et payload.
pub fn randomize_message(k: usize, m: usize, raw_message: &str, s: usize, p: f64) -> (usize, Vec<usize>) {
    debug_assert!(s < m, "le payload doit être plus petit que la plage des seaux");
    let mut rng = OsRng;

    let random_index = rng.gen_range(0..k);
    let hash_result_r = hash_encode(raw_message, random_index, m);

    let mut message_x: Vec<usize> = Vec::with_capacity(s);
    if bernoulli_sample(p, &mut rng) {
        message_x.push(hash_result_r);
    }
    // Tirages distincts dans [m] \ {r} par rejet
    while message_x.len() < s {
        let random_element = rng.gen_range(0..m);
        if random_element != hash_result_r && !message_x.contains(&random_element) {
            message_x.push(random_element);
        }
    }
    (random_index, message_x)
}

/// Algorithme LDP embarqué : randomise puis chiffre chaque message.
///
/// Les entrées `None` (valeurs manquantes) sont ignorées.
pub fn on_device_ldp_algorithm(
    k: usize,
    m: usize,
    d: &[Option<String>],
    s: usize,
    p: f64,
    pk: &PublicKey,
) -> Result<ClientBatch, CryptoError> {
    let m_bytes_length = byte_length(m);
    let k_bytes_length = byte_length(k);

    let mut encrypted_messages = Vec::new();
    let mut hash_indexes = Vec::new();
    let mut plaintext_messages = Vec::new();

    for raw_message in d.iter().flatten() {
        let (random_index, message_x) = randomize_message(k, m, raw_message, s, p);

        let mut plaintext_x = serialize_integers_to_bytes(&message_x, m_bytes_length);
        plaintext_x.extend_from_slice(&serialize_integers_to_bytes(&[random_index], k_bytes_length));

        let ciphertext = r_encrypt(&plaintext_x, pk)?;
        encrypted_messages.push(ciphertext);
        hash_indexes.push(random_index);
        plaintext_messages.push(message_x);
    }

    Ok(ClientBatch {
        encrypted_messages,
        hash_indexes,
        plaintext_messages,
    })
}
