pub mod models;

pub use models::{CreateTrainer, Trainer};
