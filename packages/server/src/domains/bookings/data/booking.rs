use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domains::bookings::models::Booking;

/// Booking data type returned over the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingData {
    pub id: String,
    pub customer_id: String,
    pub booking_type: String,
    pub status: String,

    // Allocation state
    pub matching_status: String,
    pub trainer_id: Option<String>,
    pub fallback_to_admin: bool,
    pub auto_match_deadline: Option<DateTime<Utc>>,
    pub trainer_confirmed_at: Option<DateTime<Utc>>,
    pub admin_matched_at: Option<DateTime<Utc>>,

    // Requirements
    pub service_type: String,
    pub session_type: String,
    pub booking_date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: i32,
    pub specialty_request: Option<String>,
    pub address: Option<String>,

    // Commercial
    pub price_per_person: Option<Decimal>,
    pub total_price: Option<Decimal>,

    pub created_at: DateTime<Utc>,
}

impl From<Booking> for BookingData {
    fn from(booking: Booking) -> Self {
        Self {
            id: booking.id.to_string(),
            customer_id: booking.customer_id.to_string(),
            booking_type: booking.booking_type,
            status: booking.status,
            matching_status: booking.matching_status,
            trainer_id: booking.trainer_id.map(|id| id.to_string()),
            fallback_to_admin: booking.fallback_to_admin,
            auto_match_deadline: booking.auto_match_deadline,
            trainer_confirmed_at: booking.trainer_confirmed_at,
            admin_matched_at: booking.admin_matched_at,
            service_type: booking.service_type,
            session_type: booking.session_type,
            booking_date: booking.booking_date,
            start_time: booking.start_time,
            duration_minutes: booking.duration_minutes,
            specialty_request: booking.specialty_request,
            address: booking.address,
            price_per_person: booking.price_per_person,
            total_price: booking.total_price,
            created_at: booking.created_at,
        }
    }
}

/// Input for creating a booking. A trainer id makes it a direct booking;
/// without one it enters the recommended matching flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBookingInput {
    pub service_type: String,
    pub session_type: Option<String>,
    pub booking_date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: Option<i32>,
    pub specialty_request: Option<String>,
    pub address: Option<String>,
    pub max_hourly_rate: Option<Decimal>,
    pub customer_notes: Option<String>,
    pub trainer_id: Option<String>,
}
