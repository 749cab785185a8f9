pub mod r_decrypt;

pub use r_decrypt::r_decrypt;
