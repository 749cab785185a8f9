pub mod sum_only;
pub mod treesumexplorer;

pub use sum_only::improved_attack_with_sum_only;
pub use treesumexplorer::{n_sum, psi_sum_attack, solve_equation};
