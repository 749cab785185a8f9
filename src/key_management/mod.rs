pub mod key_storage;

// Réexportations key_storage
pub use key_storage::{
    biguint_to_hex, ensure_keys_directory, hex_to_biguint, json_to_keypair, json_to_public_key,
    json_to_secret_key, key_file_exists, keypair_to_json, load_keypair_json, load_public_key_json,
    public_key_to_json, save_keypair_json, save_public_key_json, secret_key_to_json, KeyPairJson,
    PublicKeyJson, SecretKeyJson,
};
