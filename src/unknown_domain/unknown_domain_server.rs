// =========================================================
// Serveur final du volet « domaine inconnu » — déchiffre les
// survivants du seuillage et rend les chaînes en clair.
// =========================================================

use crate::crypto_error::CryptoError;
use crate::rsa_oaep::r_decrypt::r_decrypt::r_decrypt;
use crate::rsa_oaep::r_keygen::KeyPair;

pub struct UnknownDomainServer {
    keypair: KeyPair,
}

impl UnknownDomainServer {
    pub fn new(keypair: KeyPair) -> UnknownDomainServer {
        UnknownDomainServer { keypair }
    }

    /// Déchiffre les chiffrés internes libérés par le serveur auxiliaire.
    pub fn decrypt_message(
        &self,
        encrypted_messages: &[Vec<u8>],
    ) -> Result<Vec<String>, CryptoError> {
        let mut result = Vec::with_capacity(encrypted_messages.len());
        for message in encrypted_messages {
            let decrypted_message =
                r_decrypt(message, &self.keypair.public_key, &self.keypair.secret_key)?;
            let plaintext =
                String::from_utf8(decrypted_message).map_err(|_| CryptoError::Utf8DecodeFailed)?;
            result.push(plaintext);
        }
        Ok(result)
    }
}

// ============================================================================
// Tests d'intégration du pipeline complet
// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use crate::gcms::gcms_shuffler::shuffle;
    use crate::rsa_oaep::r_keygen::r_keygen::r_keygen;
    use crate::unknown_domain::unknown_domain_aux_server::{
        ThresholdParams, UnknownDomainAuxServer,
    };
    use crate::unknown_domain::unknown_domain_client::on_device_algorithm;

    #[test]
    fn test_pipeline_frequents_liberes_singletons_elimines() {
        // Serveur : bloc de 96 octets (chiffré interne), auxiliaire : bloc
        // de 256 octets, assez pour 96 + 32
        let server_kp = r_keygen(768).unwrap();
        let aux_kp = r_keygen(2048).unwrap();

        let mut data: Vec<String> = Vec::new();
        data.extend(std::iter::repeat("123".to_string()).take(40));
        data.push("rare".to_string());

        let params = ThresholdParams {
            epsilon: 0.5,
            delta: 1.0 / (100.0 * data.len() as f64),
        };
        // T ≈ 16.3 : le groupe de 40 passe sauf queue de Laplace extrême,
        // le singleton est rejeté avec probabilité ~1 - 3e-4
        let t = params.threshold();

        let encrypted = on_device_algorithm(&data, &server_kp.public_key, &aux_kp.public_key)
            .unwrap();
        let shuffled = shuffle(&encrypted);

        let aux_server = UnknownDomainAuxServer::new(aux_kp);
        let released = aux_server
            .dp_protection(&shuffled, t, params.scale())
            .unwrap();

        let server = UnknownDomainServer::new(server_kp);
        let result = server.decrypt_message(&released).unwrap();

        assert!(result.contains(&"123".to_string()), "message fréquent perdu");
        assert!(!result.contains(&"rare".to_string()), "singleton libéré");
        // Au plus un représentant par groupe
        assert!(result.len() <= 2);
    }

    #[test]
    fn test_groupage_par_hachage() {
        // Deux messages identiques chiffrés séparément tombent dans le même
        // groupe : un seul représentant sort
        let server_kp = r_keygen(768).unwrap();
        let aux_kp = r_keygen(2048).unwrap();

        let data = vec!["abc".to_string(), "abc".to_string(), "abc".to_string()];
        let encrypted =
            on_device_algorithm(&data, &server_kp.public_key, &aux_kp.public_key).unwrap();

        let aux_server = UnknownDomainAuxServer::new(aux_kp);
        // Seuil 0, bruit nul : tout groupe est libéré
        let released = aux_server.dp_protection(&encrypted, 0.0, 0.0).unwrap();
        assert_eq!(released.len(), 1);

        let server = UnknownDomainServer::new(server_kp);
        assert_eq!(server.decrypt_message(&released).unwrap(), vec!["abc"]);
    }
}
