pub mod r_encrypt;

pub use r_encrypt::r_encrypt;
