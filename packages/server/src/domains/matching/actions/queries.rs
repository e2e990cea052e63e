//! Matching query actions (admin monitoring and manual-match support)
//!
//! All read-only: nothing here feeds back into the allocation protocol.

use chrono::{Duration, Utc};
use serde::Serialize;
use tracing::info;

use crate::common::{BookingId, Visitor};
use crate::domains::bookings::models::{Booking, BookingType, TrainerMatchResponse};
use crate::domains::matching::errors::MatchingError;
use crate::domains::matching::scoring::{rank_candidates, MatchRequirements, ScoredTrainer};
use crate::domains::trainers::Trainer;
use crate::kernel::ServerDeps;

/// Ranked candidate list for the admin manual-match view.
#[derive(Debug, Clone, Serialize)]
pub struct MatchCandidates {
    pub booking: Booking,
    pub candidates: Vec<ScoredTrainer>,
}

/// Aggregated counts for the admin monitoring view.
#[derive(Debug, Clone, Serialize)]
pub struct MatchingOverview {
    /// Recommended bookings still in the automated race.
    pub awaiting_match: i64,
    /// Timed out, waiting for manual admin matching.
    pub fallback_to_admin: i64,
    /// Matched in the last 24 hours (either path).
    pub matched_last_24h: i64,
    pub total_recommended: i64,
}

/// Ranked trainer choices for manually matching a booking (admin only).
///
/// By default only trainers within the booking's budget are returned;
/// `show_all` surfaces the over-budget ones too, flagged
/// `is_within_budget = false`.
pub async fn match_candidates(
    booking_id: BookingId,
    show_all: bool,
    visitor: &Visitor,
    deps: &ServerDeps,
) -> Result<MatchCandidates, MatchingError> {
    visitor
        .member_id
        .ok_or(MatchingError::AuthenticationRequired)?;
    if !visitor.is_admin() {
        return Err(MatchingError::AdminRequired);
    }

    let booking = Booking::find_by_id_optional(booking_id, &deps.db_pool)
        .await?
        .ok_or(MatchingError::BookingNotFound)?;

    if booking.booking_type()? != BookingType::Recommended {
        return Err(MatchingError::NotRecommended);
    }

    let requirements =
        MatchRequirements::from_booking(&booking, deps.matching.default_max_hourly_rate)?;

    let eligible = Trainer::find_eligible(requirements.service_type, &deps.db_pool).await?;
    let trainer_ids: Vec<_> = eligible.iter().map(|t| t.id).collect();
    let workloads = Trainer::count_active_bookings_for_many(&trainer_ids, &deps.db_pool).await?;

    let pool: Vec<(Trainer, i64)> = eligible
        .into_iter()
        .map(|t| {
            let workload = workloads.get(&t.id).copied().unwrap_or(0);
            (t, workload)
        })
        .collect();

    let mut candidates = rank_candidates(&requirements, &pool);
    if !show_all {
        candidates.retain(|c| c.is_within_budget);
    }

    info!(
        booking_id = %booking_id,
        candidates = candidates.len(),
        show_all,
        "Ranked manual-match candidates"
    );

    Ok(MatchCandidates {
        booking,
        candidates,
    })
}

/// Aggregated matching counts for the admin dashboard (admin only).
pub async fn matching_overview(
    visitor: &Visitor,
    deps: &ServerDeps,
) -> Result<MatchingOverview, MatchingError> {
    visitor
        .member_id
        .ok_or(MatchingError::AuthenticationRequired)?;
    if !visitor.is_admin() {
        return Err(MatchingError::AdminRequired);
    }

    let cutoff = Utc::now() - Duration::hours(24);

    Ok(MatchingOverview {
        awaiting_match: Booking::count_awaiting_match(&deps.db_pool).await?,
        fallback_to_admin: Booking::count_fallback(&deps.db_pool).await?,
        matched_last_24h: Booking::count_matched_since(cutoff, &deps.db_pool).await?,
        total_recommended: Booking::count_recommended(&deps.db_pool).await?,
    })
}

/// Recommended bookings waiting in the manual-match queue, oldest first
/// (admin only).
pub async fn fallback_queue(
    visitor: &Visitor,
    deps: &ServerDeps,
) -> Result<Vec<Booking>, MatchingError> {
    visitor
        .member_id
        .ok_or(MatchingError::AuthenticationRequired)?;
    if !visitor.is_admin() {
        return Err(MatchingError::AdminRequired);
    }

    let bookings = Booking::find_fallback_queue(&deps.db_pool).await?;
    Ok(bookings)
}

/// Full response log for a booking (admin only) - the durable record of
/// the race outcome for every participant, used for dispute resolution.
pub async fn match_responses(
    booking_id: BookingId,
    visitor: &Visitor,
    deps: &ServerDeps,
) -> Result<Vec<TrainerMatchResponse>, MatchingError> {
    visitor
        .member_id
        .ok_or(MatchingError::AuthenticationRequired)?;
    if !visitor.is_admin() {
        return Err(MatchingError::AdminRequired);
    }

    Booking::find_by_id_optional(booking_id, &deps.db_pool)
        .await?
        .ok_or(MatchingError::BookingNotFound)?;

    let responses = TrainerMatchResponse::find_by_booking(booking_id, &deps.db_pool).await?;
    Ok(responses)
}
