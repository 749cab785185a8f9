use crate::crypto_error::CryptoError;
use crate::rsa_oaep::r_keygen::{KeyPair, PublicKey, SecretKey};
use num_bigint::BigUint;
use num_integer::Integer;
use num_traits::Num;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::Path;

// ============================================================================
// Bornes anti-DoS du parsing de clés
//
// Les cinq champs hexadécimaux d'une paire RSA (n, e, d, p, q) sont bornés
// par la plus grande clé admise au chargement : un entier < 2^MAX_MODULUS_BITS
// s'écrit sur MAX_MODULUS_BITS/4 chiffres hex, et BigUint::from_str_radix
// est quadratique en la taille de son entrée. Champ vérifié avant toute
// conversion, taille du fichier vérifiée avant toute lecture : un fichier
// hostile ne coûte jamais plus qu'un stat().
// ============================================================================

/// Plus grand module RSA accepté au chargement (8192 bits)
const MAX_MODULUS_BITS: u64 = 8_192;

/// Longueur maximale d'un champ hexadécimal : un entier < 2^MAX_MODULUS_BITS
const MAX_HEX_FIELD_LEN: usize = (MAX_MODULUS_BITS / 4) as usize;

/// Taille maximale d'un fichier de clés : cinq champs hex bornés plus
/// l'enrobage JSON, arrondi large
const MAX_KEY_FILE_BYTES: u64 = 8 * MAX_HEX_FIELD_LEN as u64;

// ============================================================================
// Structures JSON pour la sérialisation des clés
// ============================================================================

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PublicKeyJson {
    pub n: String,
    pub e: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SecretKeyJson {
    pub d: String,
    pub p: String,
    pub q: String,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct KeyPairJson {
    pub public_key: PublicKeyJson,
    pub secret_key: SecretKeyJson,
}

// ============================================================================
// Conversion BigUint ↔ hexadécimal
// ============================================================================

pub fn biguint_to_hex(value: &BigUint) -> String {
    value.to_str_radix(16)
}

/// Convertit une string hex en BigUint, longueur bornée avant conversion.
pub fn hex_to_biguint(hex_str: &str) -> Result<BigUint, CryptoError> {
    if hex_str.len() > MAX_HEX_FIELD_LEN {
        return Err(CryptoError::HexFieldTooLong {
            actual: hex_str.len(),
            maximum: MAX_HEX_FIELD_LEN,
        });
    }
    BigUint::from_str_radix(hex_str, 16).map_err(|_| CryptoError::HexParseError)
}

// ============================================================================
// Conversion structures Rust → JSON
// ============================================================================

pub fn public_key_to_json(pk: &PublicKey) -> PublicKeyJson {
    PublicKeyJson {
        n: biguint_to_hex(&pk.n),
        e: biguint_to_hex(&pk.e),
    }
}

pub fn secret_key_to_json(sk: &SecretKey) -> SecretKeyJson {
    SecretKeyJson {
        d: biguint_to_hex(&sk.d),
        p: biguint_to_hex(&sk.p),
        q: biguint_to_hex(&sk.q),
    }
}

pub fn keypair_to_json(kp: &KeyPair) -> KeyPairJson {
    KeyPairJson {
        public_key: public_key_to_json(&kp.public_key),
        secret_key: secret_key_to_json(&kp.secret_key),
    }
}

// ============================================================================
// Conversion JSON → structures Rust
//
// Un fichier de clés est une entrée non fiable : au-delà du parsing, la
// paire rechargée doit encore ressembler à une clé RSA.
// ============================================================================

pub fn json_to_public_key(json: &PublicKeyJson) -> Result<PublicKey, CryptoError> {
    Ok(PublicKey {
        n: hex_to_biguint(&json.n)?,
        e: hex_to_biguint(&json.e)?,
    })
}

pub fn json_to_secret_key(json: &SecretKeyJson) -> Result<SecretKey, CryptoError> {
    Ok(SecretKey {
        d: hex_to_biguint(&json.d)?,
        p: hex_to_biguint(&json.p)?,
        q: hex_to_biguint(&json.q)?,
    })
}

pub fn json_to_keypair(json: &KeyPairJson) -> Result<KeyPair, CryptoError> {
    let public_key = json_to_public_key(&json.public_key)?;
    let secret_key = json_to_secret_key(&json.secret_key)?;

    // Validation structurelle : n doit être le produit des facteurs stockés,
    // l'exposant privé doit vivre sous n, l'exposant public doit être un
    // impair d'au moins 3. Tout écart signale un fichier corrompu ou falsifié.
    if public_key.n != &secret_key.p * &secret_key.q
        || secret_key.d >= public_key.n
        || public_key.e.is_even()
        || public_key.e < BigUint::from(3u32)
    {
        return Err(CryptoError::KeyCoherenceError);
    }

    Ok(KeyPair {
        public_key,
        secret_key,
    })
}

// ============================================================================
// Lecture bornée
//
// La métadonnée est consultée avant d'ouvrir le contenu : un fichier
// au-delà de la borne n'est jamais chargé en mémoire.
// ============================================================================

fn read_bounded(filepath: &str) -> io::Result<String> {
    let meta = fs::metadata(filepath)?;
    if meta.len() > MAX_KEY_FILE_BYTES {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!(
                "Fichier de clés de {} octets, borne fixée à {} octets",
                meta.len(),
                MAX_KEY_FILE_BYTES
            ),
        ));
    }
    fs::read_to_string(filepath)
}

// ============================================================================
// Sauvegarde JSON sur disque
// ============================================================================

pub fn save_keypair_json(kp: &KeyPair, filepath: &str) -> io::Result<()> {
    let json = serde_json::to_string_pretty(&keypair_to_json(kp))?;
    fs::write(filepath, json)?;
    Ok(())
}

pub fn save_public_key_json(pk: &PublicKey, filepath: &str) -> io::Result<()> {
    let json = serde_json::to_string_pretty(&public_key_to_json(pk))?;
    fs::write(filepath, json)?;
    Ok(())
}

// ============================================================================
// Chargement JSON depuis disque
// ============================================================================

pub fn load_keypair_json(filepath: &str) -> io::Result<KeyPair> {
    let raw = read_bounded(filepath)?;
    let json: KeyPairJson = serde_json::from_str(&raw)?;
    json_to_keypair(&json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
}

pub fn load_public_key_json(filepath: &str) -> io::Result<PublicKey> {
    let raw = read_bounded(filepath)?;
    let json: PublicKeyJson = serde_json::from_str(&raw)?;
    json_to_public_key(&json)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
}

// ============================================================================
// Utilitaires
// ============================================================================

pub fn key_file_exists(filepath: &str) -> bool {
    Path::new(filepath).exists()
}

pub fn ensure_keys_directory(dir_path: &str) -> io::Result<()> {
    if !Path::new(dir_path).exists() {
        fs::create_dir_all(dir_path)?;
    }
    Ok(())
}

// ============================================================================
// Tests unitaires
// ============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    // Paire de clés minuscule, structurellement valide, pour les tests de
    // format (n = 7·11, d < n, e impair)
    fn tiny_keypair() -> KeyPair {
        KeyPair {
            public_key: PublicKey {
                n: BigUint::from(77u32),
                e: BigUint::from(65537u32),
            },
            secret_key: SecretKey {
                d: BigUint::from(13u32),
                p: BigUint::from(7u32),
                q: BigUint::from(11u32),
            },
        }
    }

    #[test]
    fn test_aller_retour_json() {
        let kp = tiny_keypair();
        let json = keypair_to_json(&kp);
        let restored = json_to_keypair(&json).unwrap();
        assert_eq!(restored.public_key.n, kp.public_key.n);
        assert_eq!(restored.public_key.e, kp.public_key.e);
        assert_eq!(restored.secret_key.d, kp.secret_key.d);
    }

    #[test]
    fn test_facteurs_incoherents_refuses() {
        let mut json = keypair_to_json(&tiny_keypair());
        json.secret_key.p = "5".to_string(); // 5*11 != 77
        assert!(matches!(
            json_to_keypair(&json),
            Err(CryptoError::KeyCoherenceError)
        ));
    }

    #[test]
    fn test_exposant_public_pair_refuse() {
        let mut json = keypair_to_json(&tiny_keypair());
        json.public_key.e = "4".to_string();
        assert!(matches!(
            json_to_keypair(&json),
            Err(CryptoError::KeyCoherenceError)
        ));
    }

    #[test]
    fn test_exposant_prive_hors_module_refuse() {
        let mut json = keypair_to_json(&tiny_keypair());
        json.secret_key.d = biguint_to_hex(&BigUint::from(100u32)); // 100 >= 77
        assert!(matches!(
            json_to_keypair(&json),
            Err(CryptoError::KeyCoherenceError)
        ));
    }

    #[test]
    fn test_hex_invalide() {
        assert_eq!(hex_to_biguint("ZZZ"), Err(CryptoError::HexParseError));
    }

    #[test]
    fn test_hex_trop_long() {
        let huge = "f".repeat(MAX_HEX_FIELD_LEN + 1);
        assert!(matches!(
            hex_to_biguint(&huge),
            Err(CryptoError::HexFieldTooLong { .. })
        ));
    }

    #[test]
    fn test_sauvegarde_et_chargement() {
        let kp = tiny_keypair();
        let path = std::env::temp_dir().join("anonpsi_crypto_test_keypair.json");
        let path_str = path.to_str().unwrap();
        save_keypair_json(&kp, path_str).unwrap();
        let loaded = load_keypair_json(path_str).unwrap();
        assert_eq!(loaded.public_key.n, kp.public_key.n);
        fs::remove_file(path).ok();
    }
}
