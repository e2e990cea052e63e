pub mod booking;

pub use booking::{BookingData, CreateBookingInput};
