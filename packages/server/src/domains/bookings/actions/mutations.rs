//! Booking mutation actions (boundary glue around the matching core)

use anyhow::{Context, Result};
use tracing::info;

use crate::common::{TrainerId, Visitor};
use crate::domains::bookings::data::CreateBookingInput;
use crate::domains::bookings::models::{Booking, BookingType, CreateBooking};
use crate::domains::customers::Customer;
use crate::domains::trainers::Trainer;
use crate::kernel::ServerDeps;

/// Create a booking for the calling customer.
///
/// A chosen trainer makes it a direct booking; without one it becomes a
/// recommended booking and waits for the payment-completion hook to start
/// automated matching.
pub async fn create_booking(
    input: CreateBookingInput,
    visitor: &Visitor,
    deps: &ServerDeps,
) -> Result<Booking> {
    let member_id = visitor.require_auth()?;
    let customer = Customer::find_by_member_id(member_id, &deps.db_pool)
        .await?
        .context("No customer profile for this member")?;

    let trainer_id = match &input.trainer_id {
        Some(raw) => {
            let id = TrainerId::parse(raw).context("Invalid trainer ID")?;
            // Direct bookings must point at a real trainer.
            Trainer::find_by_id_optional(id, &deps.db_pool)
                .await?
                .context("Trainer not found")?;
            Some(id)
        }
        None => None,
    };

    let booking_type = match trainer_id {
        Some(_) => BookingType::Direct,
        None => BookingType::Recommended,
    };

    let create = CreateBooking {
        customer_id: customer.id,
        booking_type,
        service_type: input.service_type.parse()?,
        session_type: input
            .session_type
            .as_deref()
            .unwrap_or("one_on_one")
            .parse()?,
        booking_date: input.booking_date,
        start_time: input.start_time,
        duration_minutes: input.duration_minutes.unwrap_or(60),
        specialty_request: input.specialty_request,
        address: input.address,
        max_hourly_rate: input.max_hourly_rate,
        customer_notes: input.customer_notes,
        trainer_id,
    };

    let booking = Booking::create(create, &deps.db_pool).await?;

    info!(
        booking_id = %booking.id,
        booking_type = %booking.booking_type,
        "Booking created"
    );

    Ok(booking)
}
