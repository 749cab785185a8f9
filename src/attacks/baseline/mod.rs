pub mod baseline;
pub mod improved_baseline;

pub use baseline::{baseline_attack_with_limited_call, ForestEntry};
pub use improved_baseline::improved_baseline_attack_with_limited_call;
