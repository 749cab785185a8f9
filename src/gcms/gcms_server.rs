// =========================================================
// Serveur GCMS — agrégation en matrice d'esquisse et
// estimation de fréquence.
//
// La matrice M est un quadrillage k×m de compteurs : la
// ligne est l'indice de fonction de hachage choisi par le
// client, la colonne le seau haché. Elle n'est mutée que par
// le serveur, après mélange : aucun accès concurrent.
//
// Estimateur non biaisé pour une requête q :
//   total = Σ_i M[i][h_i(q)]
//   q_prob = (p·(s−1) + (1−p)·s) / (m−1)
//   f̂(q) = (total − p·n/m − q_prob·n·(1 − 1/m))
//           / ((p − q_prob)·(1 − 1/m))
// =========================================================

use crate::crypto_error::CryptoError;
use crate::gcms::gcms_utils::{byte_length, deserialize_integers_from_bytes, hash_encode};
use crate::rsa_oaep::r_decrypt::r_decrypt::r_decrypt;
use crate::rsa_oaep::r_keygen::KeyPair;

pub struct GcmsServer {
    k: usize,
    m: usize,
    keypair: KeyPair,
    matrix: Vec<Vec<u64>>,
    m_bytes_length: usize,
    k_bytes_length: usize,
    n: usize,
}

impl GcmsServer {
    pub fn new(k: usize, m: usize, keypair: KeyPair) -> GcmsServer {
        GcmsServer {
            k,
            m,
            keypair,
            matrix: vec![vec![0u64; m]; k],
            m_bytes_length: byte_length(m),
            k_bytes_length: byte_length(k),
            n: 0,
        }
    }

    /// Déchiffre un lot de messages : rend (payloads, indices de hachage).
    ///
    /// Un échec de déchiffrement ou un plaintext mal formé remonte tel quel
    /// à l'appelant : aucune tentative de récupération.
    pub fn decrypt_message(
        &self,
        encrypted_messages: &[Vec<u8>],
    ) -> Result<(Vec<Vec<usize>>, Vec<usize>), CryptoError> {
        let mut hash_indexes = Vec::with_capacity(encrypted_messages.len());
        let mut plaintext_messages = Vec::with_capacity(encrypted_messages.len());

        for message in encrypted_messages {
            let decrypted_message =
                r_decrypt(message, &self.keypair.public_key, &self.keypair.secret_key)?;
            if decrypted_message.len() < self.k_bytes_length
                || (decrypted_message.len() - self.k_bytes_length) % self.m_bytes_length != 0
            {
                return Err(CryptoError::MalformedPayload);
            }
            let split = decrypted_message.len() - self.k_bytes_length;
            let hash_index = deserialize_integers_from_bytes(
                &decrypted_message[split..],
                self.k_bytes_length,
            )
            .first()
            .copied()
            .unwrap_or(0);
            let plaintext_message =
                deserialize_integers_from_bytes(&decrypted_message[..split], self.m_bytes_length);

            if hash_index >= self.k || plaintext_message.iter().any(|&v| v >= self.m) {
                return Err(CryptoError::MalformedPayload);
            }
            hash_indexes.push(hash_index);
            plaintext_messages.push(plaintext_message);
        }

        Ok((plaintext_messages, hash_indexes))
    }

    /// Incrémente la matrice d'esquisse avec un lot de payloads en clair.
    pub fn construct_sketch_matrix(
        &mut self,
        plaintext_messages: &[Vec<usize>],
        hash_indexes: &[usize],
    ) {
        debug_assert_eq!(plaintext_messages.len(), hash_indexes.len());
        self.n += plaintext_messages.len();
        for (payload, &row) in plaintext_messages.iter().zip(hash_indexes) {
            for &bucket in payload {
                self.matrix[row][bucket] += 1;
            }
        }
    }

    /// Estimateur de fréquence non biaisé pour `message`.
    pub fn estimate_frequency(&self, message: &str, p: f64, s: usize) -> f64 {
        let mut total_count = 0u64;
        for i in 0..self.k {
            let hash_result_i = hash_encode(message, i, self.m);
            total_count += self.matrix[i][hash_result_i];
        }
        let m = self.m as f64;
        let n = self.n as f64;
        let q_prob = (p * (s as f64 - 1.0) + (1.0 - p) * s as f64) / (m - 1.0);
        (total_count as f64 - p * n / m - q_prob * n * (1.0 - 1.0 / m))
            / ((p - q_prob) * (1.0 - 1.0 / m))
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcms::gcms_client::randomize_message;
    use crate::gcms::gcms_utils::GcmsParams;
    use crate::rsa_oaep::r_keygen::{PublicKey, SecretKey};
    use num_bigint::BigUint;

    // Paire de clés factice : les tests de l'esquisse n'utilisent jamais
    // le chemin chiffré
    fn dummy_keypair() -> KeyPair {
        KeyPair {
            public_key: PublicKey {
                n: BigUint::from(77u32),
                e: BigUint::from(65537u32),
            },
            secret_key: SecretKey {
                d: BigUint::from(1u32),
                p: BigUint::from(7u32),
                q: BigUint::from(11u32),
            },
        }
    }

    #[test]
    fn test_matrice_incrementee() {
        let mut server = GcmsServer::new(4, 16, dummy_keypair());
        server.construct_sketch_matrix(&[vec![3, 5], vec![5, 9]], &[0, 2]);
        assert_eq!(server.matrix[0][3], 1);
        assert_eq!(server.matrix[0][5], 1);
        assert_eq!(server.matrix[2][5], 1);
        assert_eq!(server.matrix[2][9], 1);
        assert_eq!(server.n, 2);
    }

    #[test]
    fn test_pipeline_chiffre_de_bout_en_bout() {
        use crate::gcms::gcms_client::on_device_ldp_algorithm;
        use crate::gcms::gcms_shuffler::shuffle;
        use crate::rsa_oaep::r_keygen::r_keygen::r_keygen;

        // Petits paramètres : payload de 17 octets, bloc OAEP de 128
        let (k, m, s, p) = (16usize, 256usize, 8usize, 0.5f64);
        let keypair = r_keygen(1024).unwrap();

        let data: Vec<Option<String>> = (0..20).map(|i| Some(format!("msg{}", i % 4))).collect();
        let batch = on_device_ldp_algorithm(k, m, &data, s, p, &keypair.public_key).unwrap();
        assert_eq!(batch.encrypted_messages.len(), 20);

        let shuffled = shuffle(&batch.encrypted_messages);
        let server = GcmsServer::new(k, m, keypair);
        let (plaintexts, hash_indexes) = server.decrypt_message(&shuffled).unwrap();

        // Après mélange, les multi-ensembles décodés coïncident avec l'état
        // pré-chiffrement du client
        let mut got: Vec<(usize, Vec<usize>)> =
            hash_indexes.into_iter().zip(plaintexts).collect();
        let mut expected: Vec<(usize, Vec<usize>)> = batch
            .hash_indexes
            .into_iter()
            .zip(batch.plaintext_messages)
            .collect();
        got.sort();
        expected.sort();
        assert_eq!(got, expected);
    }

    #[test]
    fn test_estimateur_converge_vers_la_frequence_vraie() {
        // Paramètres de référence du mécanisme ; 50 répétitions sur le
        // chemin pré-chiffrement (la randomisation client suffit, la
        // couche RSA n'influe pas sur l'estimateur)
        let params = GcmsParams {
            k: 1000,
            m: 1024,
            s: 56,
            p: 0.5,
        };
        let mut data: Vec<&str> = Vec::new();
        data.extend(std::iter::repeat("123").take(100));
        data.extend(std::iter::repeat("456").take(50));
        data.extend(std::iter::repeat("789").take(25));

        let bench_nums = 50;
        let mut estimates = Vec::with_capacity(bench_nums);
        for _ in 0..bench_nums {
            let mut server = GcmsServer::new(params.k, params.m, dummy_keypair());
            let mut payloads = Vec::new();
            let mut indexes = Vec::new();
            for message in &data {
                let (index, payload) =
                    randomize_message(params.k, params.m, message, params.s, params.p);
                indexes.push(index);
                payloads.push(payload);
            }
            server.construct_sketch_matrix(&payloads, &indexes);
            estimates.push(server.estimate_frequency("123", params.p, params.s));
        }
        let mean = estimates.iter().sum::<f64>() / bench_nums as f64;
        assert!(
            (80.0..=120.0).contains(&mean),
            "estimation moyenne {mean} hors de [80, 120]"
        );
    }
}
