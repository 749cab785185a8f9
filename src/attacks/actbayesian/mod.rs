pub mod actbayesian;

pub use actbayesian::{actbayesian, ActBayesianOutcome};
