use axum::extract::{Extension, Path};
use axum::http::StatusCode;
use axum::Json;

use crate::common::{BookingId, Visitor};
use crate::domains::bookings::actions::create_booking;
use crate::domains::bookings::data::{BookingData, CreateBookingInput};
use crate::domains::bookings::models::Booking;
use crate::server::app::AppState;
use crate::server::routes::ErrorBody;

/// POST /bookings - create a booking for the calling customer
pub async fn create_booking_handler(
    Extension(state): Extension<AppState>,
    Extension(visitor): Extension<Visitor>,
    Json(input): Json<CreateBookingInput>,
) -> Result<(StatusCode, Json<BookingData>), (StatusCode, Json<ErrorBody>)> {
    let booking = create_booking(input, &visitor, &state.deps)
        .await
        .map_err(|e| {
            (
                StatusCode::BAD_REQUEST,
                Json(ErrorBody {
                    error: e.to_string(),
                }),
            )
        })?;

    Ok((StatusCode::CREATED, Json(booking.into())))
}

/// GET /bookings/:id
pub async fn booking_handler(
    Extension(state): Extension<AppState>,
    Extension(visitor): Extension<Visitor>,
    Path(id): Path<String>,
) -> Result<Json<BookingData>, (StatusCode, Json<ErrorBody>)> {
    let not_found = || {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorBody {
                error: "Booking not found".to_string(),
            }),
        )
    };

    if visitor.require_auth().is_err() {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorBody {
                error: "Authentication required".to_string(),
            }),
        ));
    }

    let booking_id = BookingId::parse(&id).map_err(|_| not_found())?;
    let booking = Booking::find_by_id_optional(booking_id, &state.db_pool)
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody {
                    error: e.to_string(),
                }),
            )
        })?
        .ok_or_else(not_found)?;

    Ok(Json(booking.into()))
}
