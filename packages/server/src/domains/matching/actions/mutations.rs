//! Matching mutation actions
//!
//! The allocation protocol is "first successful writer wins": every claim
//! is a single conditional update carrying its own precondition
//! (`matching_status = 'pending' AND trainer_id IS NULL`), so the store -
//! not this code - serializes concurrent acceptors. Preconditions checked
//! before the write only shape the error the caller sees; the write
//! re-verifies them atomically.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{info, warn};

use crate::common::{BookingId, TrainerId, Visitor};
use crate::domains::bookings::models::{
    Booking, BookingType, MatchingStatus, ResponseType, TrainerMatchResponse,
};
use crate::domains::matching::errors::MatchingError;
use crate::domains::matching::scoring::{rank_candidates, MatchRequirements};
use crate::domains::notifications::dispatch;
use crate::domains::trainers::Trainer;
use crate::kernel::ServerDeps;

/// Result of the automated candidate-notify pass.
#[derive(Debug, Clone, Serialize)]
pub struct AutoMatchOutcome {
    pub booking: Booking,
    pub notified_trainer_ids: Vec<TrainerId>,
    /// True when no candidate could be notified and the booking went
    /// straight to manual admin matching.
    pub fallback_to_admin: bool,
}

/// Kick off automated matching for a recommended booking.
///
/// Invoked by the payment-completion hook. Scores the eligible pool,
/// persists the notify-set and deadline, and offers the booking to the
/// top-ranked trainers within budget. Runs at most once per booking.
pub async fn start_auto_match(
    booking_id: BookingId,
    deps: &ServerDeps,
) -> Result<AutoMatchOutcome, MatchingError> {
    let booking = Booking::find_by_id_optional(booking_id, &deps.db_pool)
        .await?
        .ok_or(MatchingError::BookingNotFound)?;

    if booking.booking_type()? != BookingType::Recommended {
        return Err(MatchingError::NotRecommended);
    }
    if booking.notified_at.is_some() {
        return Err(MatchingError::MatchingAlreadyStarted);
    }
    if booking.matching_status()? != MatchingStatus::Pending || booking.trainer_id.is_some() {
        return Err(MatchingError::AlreadyClaimed);
    }

    let requirements =
        MatchRequirements::from_booking(&booking, deps.matching.default_max_hourly_rate)?;

    let eligible = Trainer::find_eligible(requirements.service_type, &deps.db_pool).await?;
    let trainer_ids: Vec<TrainerId> = eligible.iter().map(|t| t.id).collect();
    let workloads = Trainer::count_active_bookings_for_many(&trainer_ids, &deps.db_pool).await?;

    let pool: Vec<(Trainer, i64)> = eligible
        .into_iter()
        .map(|t| {
            let workload = workloads.get(&t.id).copied().unwrap_or(0);
            (t, workload)
        })
        .collect();

    let ranked = rank_candidates(&requirements, &pool);

    let notify_set: Vec<_> = ranked
        .iter()
        .filter(|candidate| candidate.is_within_budget)
        .take(deps.matching.max_notified_candidates)
        .collect();

    if notify_set.is_empty() {
        // Nobody to offer the booking to: hand it to the admins now
        // instead of letting the deadline run out pointlessly.
        Booking::flag_for_admin(booking_id, &deps.db_pool).await?;
        let booking = Booking::find_by_id(booking_id, &deps.db_pool).await?;
        warn!(booking_id = %booking_id, "No eligible candidates within budget, falling back to admin");
        return Ok(AutoMatchOutcome {
            booking,
            notified_trainer_ids: vec![],
            fallback_to_admin: true,
        });
    }

    let notified_trainer_ids: Vec<TrainerId> =
        notify_set.iter().map(|c| c.trainer.id).collect();
    let deadline = chrono::Utc::now()
        + chrono::Duration::minutes(deps.matching.auto_match_timeout_minutes);

    let started =
        Booking::begin_matching(booking_id, &notified_trainer_ids, deadline, &deps.db_pool).await?;
    if !started {
        return Err(MatchingError::MatchingAlreadyStarted);
    }

    let booking = Booking::find_by_id(booking_id, &deps.db_pool).await?;

    for candidate in &notify_set {
        dispatch::notify_trainer_offer(deps, &booking, &candidate.trainer);
    }

    info!(
        booking_id = %booking_id,
        candidates = notified_trainer_ids.len(),
        deadline = %deadline,
        "Automated matching started"
    );

    Ok(AutoMatchOutcome {
        booking,
        notified_trainer_ids,
        fallback_to_admin: false,
    })
}

/// Accept a booking offer on behalf of the calling trainer.
///
/// Of N trainers notified concurrently, exactly one accept succeeds; every
/// other attempt gets a `too_late` audit row and `AlreadyClaimed`. The
/// outcome is final per booking - there is nothing to retry.
pub async fn accept_booking_request(
    booking_id: BookingId,
    visitor: &Visitor,
    deps: &ServerDeps,
) -> Result<Booking, MatchingError> {
    let member_id = visitor
        .member_id
        .ok_or(MatchingError::AuthenticationRequired)?;
    let trainer = Trainer::find_by_member_id(member_id, &deps.db_pool)
        .await?
        .ok_or(MatchingError::NotATrainer)?;

    let booking = Booking::find_by_id_optional(booking_id, &deps.db_pool)
        .await?
        .ok_or(MatchingError::BookingNotFound)?;

    if booking.booking_type()? != BookingType::Recommended {
        return Err(MatchingError::NotRecommended);
    }
    if !booking.is_pending_trainer(trainer.id) {
        return Err(MatchingError::NotInvited);
    }

    // Observed-state check. The claim below re-verifies this atomically;
    // failing here just spares a doomed write and records the loss.
    if booking.matching_status()? != MatchingStatus::Pending || booking.trainer_id.is_some() {
        log_response_best_effort(booking_id, trainer.id, ResponseType::TooLate, None, None, deps)
            .await;
        return Err(MatchingError::AlreadyClaimed);
    }

    if deps.matching.reject_accept_after_decline
        && TrainerMatchResponse::has_declined(booking_id, trainer.id, &deps.db_pool).await?
    {
        return Err(MatchingError::DeclinedEarlier);
    }

    let session_type = booking.session_type()?;
    let price_per_person = trainer.hourly_rate;
    let total_price = trainer.hourly_rate * Decimal::from(session_type.participants());

    let claimed = Booking::claim_for_trainer(
        booking_id,
        trainer.id,
        price_per_person,
        total_price,
        &deps.db_pool,
    )
    .await?;

    let Some(booking) = claimed else {
        // Zero rows affected: someone else won between our read and write.
        log_response_best_effort(booking_id, trainer.id, ResponseType::TooLate, None, None, deps)
            .await;
        info!(booking_id = %booking_id, trainer_id = %trainer.id, "Accept lost the race");
        return Err(MatchingError::AlreadyClaimed);
    };

    log_response_best_effort(booking_id, trainer.id, ResponseType::Accepted, None, None, deps)
        .await;
    dispatch::notify_customer_matched(deps, &booking, &trainer);

    info!(
        booking_id = %booking_id,
        trainer_id = %trainer.id,
        total_price = %total_price,
        "Trainer won the booking"
    );

    Ok(booking)
}

/// Decline a booking offer.
///
/// A pure audit-log append: the booking itself is untouched and the
/// trainer stays in the notify-set. Whether a later accept is still
/// allowed is governed by `matching.reject_accept_after_decline`.
pub async fn decline_booking_request(
    booking_id: BookingId,
    visitor: &Visitor,
    reason: Option<&str>,
    note: Option<&str>,
    deps: &ServerDeps,
) -> Result<TrainerMatchResponse, MatchingError> {
    let member_id = visitor
        .member_id
        .ok_or(MatchingError::AuthenticationRequired)?;
    let trainer = Trainer::find_by_member_id(member_id, &deps.db_pool)
        .await?
        .ok_or(MatchingError::NotATrainer)?;

    let booking = Booking::find_by_id_optional(booking_id, &deps.db_pool)
        .await?
        .ok_or(MatchingError::BookingNotFound)?;

    if booking.booking_type()? != BookingType::Recommended {
        return Err(MatchingError::NotRecommended);
    }
    if !booking.is_pending_trainer(trainer.id) {
        return Err(MatchingError::NotInvited);
    }

    let response = TrainerMatchResponse::record(
        booking_id,
        trainer.id,
        ResponseType::Declined,
        reason,
        note,
        &deps.db_pool,
    )
    .await?;

    info!(booking_id = %booking_id, trainer_id = %trainer.id, reason = ?reason, "Trainer declined booking");

    Ok(response)
}

/// Manually assign a trainer to a booking (admin override).
///
/// The single-writer path after fallback. Preconditions are rejected
/// operations, not retries; the write still carries the claim predicate
/// so a concurrent stale accept cannot be overwritten.
pub async fn admin_match_booking(
    booking_id: BookingId,
    trainer_id: TrainerId,
    visitor: &Visitor,
    deps: &ServerDeps,
) -> Result<Booking, MatchingError> {
    let admin_id = visitor
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
    if booking.trainer_id.is_some() || booking.matching_status()? != MatchingStatus::Pending {
        return Err(MatchingError::AlreadyClaimed);
    }

    let trainer = Trainer::find_by_id_optional(trainer_id, &deps.db_pool)
        .await?
        .ok_or(MatchingError::TrainerNotFound)?;

    let session_type = booking.session_type()?;
    let price_per_person = trainer.hourly_rate;
    let total_price = trainer.hourly_rate * Decimal::from(session_type.participants());

    let assigned = Booking::assign_by_admin(
        booking_id,
        trainer.id,
        admin_id,
        price_per_person,
        total_price,
        &deps.db_pool,
    )
    .await?;

    let Some(booking) = assigned else {
        // A trainer accept slipped in between our read and write.
        return Err(MatchingError::AlreadyClaimed);
    };

    dispatch::notify_customer_matched(deps, &booking, &trainer);
    dispatch::notify_trainer_assigned(deps, &booking, &trainer);

    info!(
        booking_id = %booking_id,
        trainer_id = %trainer.id,
        admin_id = %admin_id,
        "Booking manually matched by admin"
    );

    Ok(booking)
}

/// Cancel a booking (admin only). Terminal, independent of matching state.
pub async fn admin_cancel_booking(
    booking_id: BookingId,
    visitor: &Visitor,
    deps: &ServerDeps,
) -> Result<Booking, MatchingError> {
    visitor
        .member_id
        .ok_or(MatchingError::AuthenticationRequired)?;
    if !visitor.is_admin() {
        return Err(MatchingError::AdminRequired);
    }

    let booking = Booking::find_by_id_optional(booking_id, &deps.db_pool)
        .await?
        .ok_or(MatchingError::BookingNotFound)?;

    let trainer = match booking.trainer_id {
        Some(trainer_id) => Trainer::find_by_id_optional(trainer_id, &deps.db_pool).await?,
        None => None,
    };

    let booking = Booking::cancel(booking_id, &deps.db_pool).await?;

    dispatch::notify_booking_cancelled(deps, &booking, trainer.as_ref());

    info!(booking_id = %booking_id, "Booking cancelled by admin");

    Ok(booking)
}

/// Append a race-outcome row without letting a log failure disturb the
/// primary operation. Losing the audit row is preferred over failing an
/// otherwise-successful claim.
async fn log_response_best_effort(
    booking_id: BookingId,
    trainer_id: TrainerId,
    response_type: ResponseType,
    reason: Option<&str>,
    note: Option<&str>,
    deps: &ServerDeps,
) {
    if let Err(e) = TrainerMatchResponse::record(
        booking_id,
        trainer_id,
        response_type,
        reason,
        note,
        &deps.db_pool,
    )
    .await
    {
        warn!(
            booking_id = %booking_id,
            trainer_id = %trainer_id,
            response_type = %response_type,
            error = %e,
            "Failed to record match response"
        );
    }
}
