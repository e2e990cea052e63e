pub mod models;

pub use models::Customer;
