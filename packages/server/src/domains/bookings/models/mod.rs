pub mod booking;
pub mod match_response;

pub use booking::{
    Booking, BookingStatus, BookingType, CreateBooking, MatchingStatus, ServiceType, SessionType,
};
pub use match_response::{ResponseType, TrainerMatchResponse};
