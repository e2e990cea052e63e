//! Templated notification dispatch for the matching flow.
//!
//! Every function here is fire-and-forget: the record insert and the push
//! send are best-effort, errors are logged, and nothing propagates back to
//! the action that triggered the dispatch. The matching core never blocks
//! its own success on a delivery outcome.

use serde_json::json;
use tracing::warn;

use crate::common::{BookingId, MemberId};
use crate::domains::bookings::models::Booking;
use crate::domains::members::Member;
use crate::domains::notifications::Notification;
use crate::domains::trainers::Trainer;
use crate::kernel::ServerDeps;

pub const KIND_MATCH_CONFIRMED: &str = "match_confirmed";
pub const KIND_MATCH_OFFER: &str = "match_offer";
pub const KIND_MATCH_ASSIGNED: &str = "match_assigned";
pub const KIND_BOOKING_CANCELLED: &str = "booking_cancelled";

/// Tell the customer their recommended booking found a trainer.
pub fn notify_customer_matched(deps: &ServerDeps, booking: &Booking, trainer: &Trainer) {
    let title = "Trainer confirmed".to_string();
    let body = format!(
        "{} will lead your session on {} at {}.",
        trainer.name, booking.booking_date, booking.start_time
    );
    send_to_customer(deps, booking, KIND_MATCH_CONFIRMED, title, body);
}

/// Offer a recommended booking to a candidate trainer.
pub fn notify_trainer_offer(deps: &ServerDeps, booking: &Booking, trainer: &Trainer) {
    let title = "New session request".to_string();
    let body = format!(
        "A {} session on {} at {} is waiting for a trainer. First to accept wins.",
        booking.service_type, booking.booking_date, booking.start_time
    );
    dispatch(
        deps.clone(),
        trainer.member_id,
        booking.id,
        KIND_MATCH_OFFER,
        title,
        body,
    );
}

/// Tell a trainer an admin assigned them a booking (no race involved).
pub fn notify_trainer_assigned(deps: &ServerDeps, booking: &Booking, trainer: &Trainer) {
    let title = "Session assigned to you".to_string();
    let body = format!(
        "You have been matched with a {} session on {} at {}.",
        booking.service_type, booking.booking_date, booking.start_time
    );
    dispatch(
        deps.clone(),
        trainer.member_id,
        booking.id,
        KIND_MATCH_ASSIGNED,
        title,
        body,
    );
}

/// Tell the customer (and the assigned trainer, if any) a booking was cancelled.
pub fn notify_booking_cancelled(deps: &ServerDeps, booking: &Booking, trainer: Option<&Trainer>) {
    let title = "Booking cancelled".to_string();
    let body = format!(
        "Your session on {} at {} has been cancelled.",
        booking.booking_date, booking.start_time
    );
    send_to_customer(
        deps,
        booking,
        KIND_BOOKING_CANCELLED,
        title.clone(),
        body.clone(),
    );

    if let Some(trainer) = trainer {
        dispatch(
            deps.clone(),
            trainer.member_id,
            booking.id,
            KIND_BOOKING_CANCELLED,
            title,
            body,
        );
    }
}

fn send_to_customer(deps: &ServerDeps, booking: &Booking, kind: &str, title: String, body: String) {
    let deps = deps.clone();
    let booking_id = booking.id;
    let customer_id = booking.customer_id;
    let kind = kind.to_string();

    tokio::spawn(async move {
        let customer = match crate::domains::customers::Customer::find_by_id_optional(
            customer_id,
            &deps.db_pool,
        )
        .await
        {
            Ok(Some(customer)) => customer,
            Ok(None) => {
                warn!(booking_id = %booking_id, "Customer gone, skipping notification");
                return;
            }
            Err(e) => {
                warn!(booking_id = %booking_id, error = %e, "Customer lookup failed, skipping notification");
                return;
            }
        };
        deliver(&deps, customer.member_id, booking_id, &kind, &title, &body).await;
    });
}

fn dispatch(
    deps: ServerDeps,
    member_id: MemberId,
    booking_id: BookingId,
    kind: &str,
    title: String,
    body: String,
) {
    let kind = kind.to_string();
    tokio::spawn(async move {
        deliver(&deps, member_id, booking_id, &kind, &title, &body).await;
    });
}

/// Record the notification, then push to the member's device if they have
/// a token. Both steps are best-effort.
async fn deliver(
    deps: &ServerDeps,
    member_id: MemberId,
    booking_id: BookingId,
    kind: &str,
    title: &str,
    body: &str,
) {
    if let Err(e) = Notification::record(member_id, booking_id, kind, title, body, &deps.db_pool).await
    {
        warn!(member_id = %member_id, booking_id = %booking_id, error = %e, "Failed to record notification");
    }

    let member = match Member::find_by_id_optional(member_id, &deps.db_pool).await {
        Ok(Some(member)) => member,
        Ok(None) => return,
        Err(e) => {
            warn!(member_id = %member_id, error = %e, "Member lookup failed, skipping push");
            return;
        }
    };

    let Some(push_token) = member.push_token else {
        return;
    };

    let data = json!({
        "type": kind,
        "bookingId": booking_id.to_string(),
    });

    if let Err(e) = deps.push_service.send(&push_token, title, body, data).await {
        warn!(member_id = %member_id, booking_id = %booking_id, error = %e, "Push delivery failed");
    }
}
