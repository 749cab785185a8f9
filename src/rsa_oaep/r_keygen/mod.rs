pub mod r_keygen;

pub use r_keygen::{modulus_byte_length, KeyPair, PublicKey, SecretKey};
