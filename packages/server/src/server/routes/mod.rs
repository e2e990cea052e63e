pub mod bookings;
pub mod health;
pub mod matching;

pub use bookings::{booking_handler, create_booking_handler};
pub use health::health_handler;
pub use matching::{
    accept_handler, admin_cancel_handler, admin_match_handler, auto_match_handler,
    candidates_handler, decline_handler, fallback_queue_handler, overview_handler,
    responses_handler,
};

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domains::matching::MatchingError;

/// Error body returned by all routes
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Thin wrapper that maps matching errors onto HTTP status codes.
/// Persistence/internal failures are logged here and surfaced as opaque
/// 500s; every domain failure keeps its descriptive message.
pub struct ApiError(pub MatchingError);

impl From<MatchingError> for ApiError {
    fn from(err: MatchingError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            MatchingError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            MatchingError::AdminRequired
            | MatchingError::NotATrainer
            | MatchingError::NotInvited => StatusCode::FORBIDDEN,
            MatchingError::BookingNotFound | MatchingError::TrainerNotFound => {
                StatusCode::NOT_FOUND
            }
            MatchingError::NotRecommended
            | MatchingError::AlreadyClaimed
            | MatchingError::DeclinedEarlier
            | MatchingError::MatchingAlreadyStarted => StatusCode::CONFLICT,
            MatchingError::Database(_) | MatchingError::Internal(_) => {
                tracing::error!(error = %self.0, "Matching action failed");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = ErrorBody {
            error: self.0.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
