pub mod mutations;

pub use mutations::create_booking;
