pub mod oaep;

pub use oaep::{i2osp, mgf1, oaep_decode, oaep_encode, HASH_LEN};
