pub mod trainer;

pub use trainer::{CreateTrainer, Trainer};
