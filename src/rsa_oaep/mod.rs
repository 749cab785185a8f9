pub mod math;
pub mod oaep;
pub mod r_decrypt;
pub mod r_encrypt;
pub mod r_keygen;
