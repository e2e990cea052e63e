pub mod customer;

pub use customer::{CreateCustomer, Customer};
