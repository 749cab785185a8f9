pub mod oracle;

pub use oracle::{psi, psi_cardinality, psi_sum, psi_sum_int};
