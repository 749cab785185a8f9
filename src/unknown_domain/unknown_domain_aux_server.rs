// =========================================================
// Serveur auxiliaire — seuillage DP pour la libération d'un
// vocabulaire inconnu.
//
// Après déchiffrement externe, les chiffrés internes sont
// groupés par leur suffixe SHA-256. Un groupe n'est libéré
// que si |groupe| + Lap(0, 1/ε) ≥ T, avec
// T = 1 + (1/ε)·ln(1/(2δ)) ; un seul représentant, tiré
// uniformément, est transmis au serveur. Les groupes sous le
// seuil disparaissent sans trace. Le serveur auxiliaire ne
// voit jamais ni le clair ni la clé du serveur : les deux
// serveurs sont supposés non colludants.
// =========================================================

use crate::crypto_error::CryptoError;
use crate::gcms::gcms_utils::generate_laplace_noise;
use crate::rsa_oaep::r_decrypt::r_decrypt::r_decrypt;
use crate::rsa_oaep::r_keygen::KeyPair;
use rand::Rng;
use rand_core::OsRng;
use std::collections::HashMap;

/// Longueur du suffixe de groupage (digest SHA-256)
const HASH_LEN: usize = 32;

/// Paramètres (ε, δ) du seuillage.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdParams {
    pub epsilon: f64,
    pub delta: f64,
}

impl ThresholdParams {
    /// Seuil de libération T = 1 + (1/ε)·ln(1/(2δ)).
    pub fn threshold(&self) -> f64 {
        1.0 + (1.0 / (2.0 * self.delta)).ln() / self.epsilon
    }

    /// Échelle du bruit de Laplace : 1/ε.
    pub fn scale(&self) -> f64 {
        1.0 / self.epsilon
    }
}

pub struct UnknownDomainAuxServer {
    keypair: KeyPair,
}

impl UnknownDomainAuxServer {
    pub fn new(keypair: KeyPair) -> UnknownDomainAuxServer {
        UnknownDomainAuxServer { keypair }
    }

    /// Seuillage DP : déchiffre, groupe par suffixe de hachage, libère un
    /// représentant par groupe au-dessus du seuil bruité.
    ///
    /// `t` est le seuil de libération, `b` l'échelle du bruit de Laplace
    /// (cf. `ThresholdParams`). Un échec de déchiffrement remonte tel quel.
    pub fn dp_protection(
        &self,
        encrypted_messages: &[Vec<u8>],
        t: f64,
        b: f64,
    ) -> Result<Vec<Vec<u8>>, CryptoError> {
        let mut key_value_groups: HashMap<Vec<u8>, Vec<Vec<u8>>> = HashMap::new();

        for message in encrypted_messages {
            let decrypted_message =
                r_decrypt(message, &self.keypair.public_key, &self.keypair.secret_key)?;
            if decrypted_message.len() < HASH_LEN {
                return Err(CryptoError::MalformedPayload);
            }
            let split = decrypted_message.len() - HASH_LEN;
            let inner_ciphertext = decrypted_message[..split].to_vec();
            let hash_suffix = decrypted_message[split..].to_vec();
            key_value_groups
                .entry(hash_suffix)
                .or_default()
                .push(inner_ciphertext);
        }

        let mut rng = OsRng;
        let mut released = Vec::new();
        for group in key_value_groups.values() {
            if group.len() as f64 + generate_laplace_noise(0.0, b, &mut rng) >= t {
                let chosen = rng.gen_range(0..group.len());
                released.push(group[chosen].clone());
            }
        }
        Ok(released)
    }
}

// ============================================================================
// Tests unitaires
// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seuil_et_echelle() {
        let params = ThresholdParams {
            epsilon: 0.1,
            delta: 1.0 / 1750.0,
        };
        let expected = 1.0 + 10.0 * (875.0f64).ln();
        assert!((params.threshold() - expected).abs() < 1e-9);
        assert!((params.scale() - 10.0).abs() < 1e-12);
    }
}
