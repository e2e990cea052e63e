//! Routes for the allocation engine: trainer accept/decline, the
//! payment-completion trigger, and admin manual matching/monitoring.
//!
//! Handlers stay thin: parse the path, pass the visitor through, let the
//! actions own every precondition.

use axum::extract::{Extension, Path, Query};
use axum::Json;
use serde::Deserialize;

use crate::common::{BookingId, TrainerId, Visitor};
use crate::domains::bookings::data::BookingData;
use crate::domains::bookings::models::TrainerMatchResponse;
use crate::domains::matching::actions::{
    accept_booking_request, admin_cancel_booking, admin_match_booking, decline_booking_request,
    fallback_queue, match_candidates, match_responses, matching_overview, start_auto_match,
    AutoMatchOutcome, MatchCandidates, MatchingOverview,
};
use crate::domains::matching::MatchingError;
use crate::server::app::AppState;
use crate::server::routes::ApiError;

fn parse_booking_id(raw: &str) -> Result<BookingId, ApiError> {
    BookingId::parse(raw).map_err(|_| ApiError(MatchingError::BookingNotFound))
}

/// POST /internal/bookings/:id/auto-match
///
/// Invoked by the payment-completion collaborator once a recommended
/// booking is paid for.
pub async fn auto_match_handler(
    Extension(state): Extension<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AutoMatchOutcome>, ApiError> {
    let booking_id = parse_booking_id(&id)?;
    let outcome = start_auto_match(booking_id, &state.deps).await?;
    Ok(Json(outcome))
}

/// POST /bookings/:id/accept - trainer claims a recommended booking
pub async fn accept_handler(
    Extension(state): Extension<AppState>,
    Extension(visitor): Extension<Visitor>,
    Path(id): Path<String>,
) -> Result<Json<BookingData>, ApiError> {
    let booking_id = parse_booking_id(&id)?;
    let booking = accept_booking_request(booking_id, &visitor, &state.deps).await?;
    Ok(Json(booking.into()))
}

#[derive(Debug, Deserialize, Default)]
pub struct DeclineInput {
    pub reason: Option<String>,
    pub note: Option<String>,
}

/// POST /bookings/:id/decline - trainer declines a recommended booking
pub async fn decline_handler(
    Extension(state): Extension<AppState>,
    Extension(visitor): Extension<Visitor>,
    Path(id): Path<String>,
    input: Option<Json<DeclineInput>>,
) -> Result<Json<TrainerMatchResponse>, ApiError> {
    let booking_id = parse_booking_id(&id)?;
    let input = input.map(|Json(input)| input).unwrap_or_default();

    let response = decline_booking_request(
        booking_id,
        &visitor,
        input.reason.as_deref(),
        input.note.as_deref(),
        &state.deps,
    )
    .await?;

    Ok(Json(response))
}

#[derive(Debug, Deserialize)]
pub struct AdminMatchInput {
    pub trainer_id: String,
}

/// POST /admin/bookings/:id/match - manually assign a trainer
pub async fn admin_match_handler(
    Extension(state): Extension<AppState>,
    Extension(visitor): Extension<Visitor>,
    Path(id): Path<String>,
    Json(input): Json<AdminMatchInput>,
) -> Result<Json<BookingData>, ApiError> {
    let booking_id = parse_booking_id(&id)?;
    let trainer_id = TrainerId::parse(&input.trainer_id)
        .map_err(|_| ApiError(MatchingError::TrainerNotFound))?;

    let booking = admin_match_booking(booking_id, trainer_id, &visitor, &state.deps).await?;
    Ok(Json(booking.into()))
}

/// POST /admin/bookings/:id/cancel
pub async fn admin_cancel_handler(
    Extension(state): Extension<AppState>,
    Extension(visitor): Extension<Visitor>,
    Path(id): Path<String>,
) -> Result<Json<BookingData>, ApiError> {
    let booking_id = parse_booking_id(&id)?;
    let booking = admin_cancel_booking(booking_id, &visitor, &state.deps).await?;
    Ok(Json(booking.into()))
}

#[derive(Debug, Deserialize, Default)]
pub struct CandidatesQuery {
    /// Include trainers over the booking's budget ceiling.
    #[serde(default)]
    pub show_all: bool,
}

/// GET /admin/bookings/:id/candidates - ranked manual-match choices
pub async fn candidates_handler(
    Extension(state): Extension<AppState>,
    Extension(visitor): Extension<Visitor>,
    Path(id): Path<String>,
    Query(query): Query<CandidatesQuery>,
) -> Result<Json<MatchCandidates>, ApiError> {
    let booking_id = parse_booking_id(&id)?;
    let candidates = match_candidates(booking_id, query.show_all, &visitor, &state.deps).await?;
    Ok(Json(candidates))
}

/// GET /admin/bookings/:id/responses - the race audit log
pub async fn responses_handler(
    Extension(state): Extension<AppState>,
    Extension(visitor): Extension<Visitor>,
    Path(id): Path<String>,
) -> Result<Json<Vec<TrainerMatchResponse>>, ApiError> {
    let booking_id = parse_booking_id(&id)?;
    let responses = match_responses(booking_id, &visitor, &state.deps).await?;
    Ok(Json(responses))
}

/// GET /admin/matching/overview - monitoring counts
pub async fn overview_handler(
    Extension(state): Extension<AppState>,
    Extension(visitor): Extension<Visitor>,
) -> Result<Json<MatchingOverview>, ApiError> {
    let overview = matching_overview(&visitor, &state.deps).await?;
    Ok(Json(overview))
}

/// GET /admin/matching/fallback-queue - bookings needing manual matching
pub async fn fallback_queue_handler(
    Extension(state): Extension<AppState>,
    Extension(visitor): Extension<Visitor>,
) -> Result<Json<Vec<BookingData>>, ApiError> {
    let bookings = fallback_queue(&visitor, &state.deps).await?;
    Ok(Json(bookings.into_iter().map(BookingData::from).collect()))
}
