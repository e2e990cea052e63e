use thiserror::Error;

/// Typed failures of the allocation engine.
///
/// Every precondition of the accept/decline/assign paths has its own
/// variant so callers can render them distinctly. These are returned as
/// values across the public contract, never thrown as control flow.
#[derive(Error, Debug)]
pub enum MatchingError {
    #[error("Authentication required")]
    AuthenticationRequired,

    #[error("Admin access required")]
    AdminRequired,

    #[error("Caller is not a registered trainer")]
    NotATrainer,

    #[error("Booking not found")]
    BookingNotFound,

    #[error("Trainer not found")]
    TrainerNotFound,

    #[error("Only recommended bookings go through matching")]
    NotRecommended,

    #[error("This booking was not offered to you")]
    NotInvited,

    #[error("Booking already claimed by another trainer")]
    AlreadyClaimed,

    #[error("You already declined this booking")]
    DeclinedEarlier,

    #[error("Automated matching already started for this booking")]
    MatchingAlreadyStarted,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
