pub mod actions;
pub mod errors;
pub mod scoring;

pub use errors::MatchingError;
pub use scoring::{MatchRequirements, ScoredTrainer};
