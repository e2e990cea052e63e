use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::{BookingId, CustomerId, MemberId, TrainerId};

/// Booking type: direct (customer chose the trainer) or recommended
/// (resolved via automated matching or admin assignment).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingType {
    Direct,
    Recommended,
}

impl std::fmt::Display for BookingType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingType::Direct => write!(f, "direct"),
            BookingType::Recommended => write!(f, "recommended"),
        }
    }
}

impl std::str::FromStr for BookingType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "direct" => Ok(BookingType::Direct),
            "recommended" => Ok(BookingType::Recommended),
            _ => Err(anyhow::anyhow!("Invalid booking type: {}", s)),
        }
    }
}

/// Booking workflow status, independent of the matching lifecycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookingStatus::Pending => write!(f, "pending"),
            BookingStatus::Confirmed => write!(f, "confirmed"),
            BookingStatus::Cancelled => write!(f, "cancelled"),
            BookingStatus::Completed => write!(f, "completed"),
        }
    }
}

impl std::str::FromStr for BookingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(BookingStatus::Pending),
            "confirmed" => Ok(BookingStatus::Confirmed),
            "cancelled" => Ok(BookingStatus::Cancelled),
            "completed" => Ok(BookingStatus::Completed),
            _ => Err(anyhow::anyhow!("Invalid booking status: {}", s)),
        }
    }
}

/// Allocation lifecycle of a recommended booking.
///
/// `Pending` is the only non-terminal state: once a booking leaves it, it
/// never returns. A timed-out booking is NOT a state of its own - it stays
/// `Pending` with `fallback_to_admin` set, awaiting manual resolution.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchingStatus {
    Pending,
    /// Won via admin assignment.
    Matched,
    /// Won via trainer accept.
    Approved,
    Expired,
}

impl MatchingStatus {
    /// Allowed transitions. Everything except `Pending` is terminal.
    pub fn can_transition_to(self, next: MatchingStatus) -> bool {
        matches!(
            (self, next),
            (
                MatchingStatus::Pending,
                MatchingStatus::Matched | MatchingStatus::Approved | MatchingStatus::Expired
            )
        )
    }
}

impl std::fmt::Display for MatchingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatchingStatus::Pending => write!(f, "pending"),
            MatchingStatus::Matched => write!(f, "matched"),
            MatchingStatus::Approved => write!(f, "approved"),
            MatchingStatus::Expired => write!(f, "expired"),
        }
    }
}

impl std::str::FromStr for MatchingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "pending" => Ok(MatchingStatus::Pending),
            "matched" => Ok(MatchingStatus::Matched),
            "approved" => Ok(MatchingStatus::Approved),
            "expired" => Ok(MatchingStatus::Expired),
            _ => Err(anyhow::anyhow!("Invalid matching status: {}", s)),
        }
    }
}

/// Where the session takes place.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ServiceType {
    HomeVisit,
    CenterVisit,
    Online,
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServiceType::HomeVisit => write!(f, "home_visit"),
            ServiceType::CenterVisit => write!(f, "center_visit"),
            ServiceType::Online => write!(f, "online"),
        }
    }
}

impl std::str::FromStr for ServiceType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "home_visit" => Ok(ServiceType::HomeVisit),
            "center_visit" => Ok(ServiceType::CenterVisit),
            "online" => Ok(ServiceType::Online),
            _ => Err(anyhow::anyhow!("Invalid service type: {}", s)),
        }
    }
}

/// Session group size. Determines the participant multiplier applied to
/// the winning trainer's hourly rate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    OneOnOne,
    TwoOnOne,
    ThreeOnOne,
}

impl SessionType {
    pub fn participants(self) -> i64 {
        match self {
            SessionType::OneOnOne => 1,
            SessionType::TwoOnOne => 2,
            SessionType::ThreeOnOne => 3,
        }
    }
}

impl std::fmt::Display for SessionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionType::OneOnOne => write!(f, "one_on_one"),
            SessionType::TwoOnOne => write!(f, "two_on_one"),
            SessionType::ThreeOnOne => write!(f, "three_on_one"),
        }
    }
}

impl std::str::FromStr for SessionType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "one_on_one" => Ok(SessionType::OneOnOne),
            "two_on_one" => Ok(SessionType::TwoOnOne),
            "three_on_one" => Ok(SessionType::ThreeOnOne),
            _ => Err(anyhow::anyhow!("Invalid session type: {}", s)),
        }
    }
}

/// Booking model - the central entity of the matching flow.
///
/// Statuses are stored as text; the enums above are used at logic seams.
/// The single shared mutable resource of the allocation protocol is this
/// row: every claim is a conditional update on
/// `matching_status = 'pending' AND trainer_id IS NULL`.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Booking {
    pub id: BookingId,
    pub customer_id: CustomerId,
    pub booking_type: String,
    pub status: String,

    // Allocation state
    pub matching_status: String,
    pub trainer_id: Option<TrainerId>,
    pub pending_trainer_ids: Vec<Uuid>,
    pub fallback_to_admin: bool,
    pub auto_match_deadline: Option<DateTime<Utc>>,
    pub notified_at: Option<DateTime<Utc>>,
    pub admin_notified_at: Option<DateTime<Utc>>,
    pub trainer_confirmed_at: Option<DateTime<Utc>>,
    pub admin_matched_at: Option<DateTime<Utc>>,
    pub admin_matched_by: Option<MemberId>,

    // Requirements consumed by the candidate selector
    pub service_type: String,
    pub session_type: String,
    pub booking_date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: i32,
    pub specialty_request: Option<String>,
    pub address: Option<String>,
    pub max_hourly_rate: Option<Decimal>,
    pub customer_notes: Option<String>,

    // Commercial fields, set when a trainer wins the booking
    pub price_per_person: Option<Decimal>,
    pub total_price: Option<Decimal>,

    // Timestamps
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new booking
#[derive(Debug, Clone)]
pub struct CreateBooking {
    pub customer_id: CustomerId,
    pub booking_type: BookingType,
    pub service_type: ServiceType,
    pub session_type: SessionType,
    pub booking_date: NaiveDate,
    pub start_time: NaiveTime,
    pub duration_minutes: i32,
    pub specialty_request: Option<String>,
    pub address: Option<String>,
    pub max_hourly_rate: Option<Decimal>,
    pub customer_notes: Option<String>,
    /// Only set for direct bookings, where the customer chose the trainer.
    pub trainer_id: Option<TrainerId>,
}

impl Booking {
    pub fn booking_type(&self) -> Result<BookingType> {
        self.booking_type.parse()
    }

    pub fn status(&self) -> Result<BookingStatus> {
        self.status.parse()
    }

    pub fn matching_status(&self) -> Result<MatchingStatus> {
        self.matching_status.parse()
    }

    pub fn service_type(&self) -> Result<ServiceType> {
        self.service_type.parse()
    }

    pub fn session_type(&self) -> Result<SessionType> {
        self.session_type.parse()
    }

    /// Whether a trainer is in the notify-set of this booking.
    pub fn is_pending_trainer(&self, trainer_id: TrainerId) -> bool {
        self.pending_trainer_ids.contains(trainer_id.as_uuid())
    }

    /// Find booking by ID
    pub async fn find_by_id(id: BookingId, pool: &PgPool) -> Result<Self> {
        let booking = sqlx::query_as::<_, Self>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(booking)
    }

    /// Find booking by ID, returning None if not found
    pub async fn find_by_id_optional(id: BookingId, pool: &PgPool) -> Result<Option<Self>> {
        let booking = sqlx::query_as::<_, Self>("SELECT * FROM bookings WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(booking)
    }

    /// Find all bookings for a customer, newest first
    pub async fn find_by_customer(customer_id: CustomerId, pool: &PgPool) -> Result<Vec<Self>> {
        let bookings = sqlx::query_as::<_, Self>(
            "SELECT * FROM bookings WHERE customer_id = $1 ORDER BY created_at DESC",
        )
        .bind(customer_id)
        .fetch_all(pool)
        .await?;
        Ok(bookings)
    }

    /// Recommended bookings flagged for manual admin matching, oldest first
    pub async fn find_fallback_queue(pool: &PgPool) -> Result<Vec<Self>> {
        let bookings = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM bookings
            WHERE booking_type = 'recommended'
              AND matching_status = 'pending'
              AND fallback_to_admin = TRUE
              AND status <> 'cancelled'
            ORDER BY created_at ASC
            "#,
        )
        .fetch_all(pool)
        .await?;
        Ok(bookings)
    }

    /// Create a new booking.
    ///
    /// Recommended bookings start with matching_status = 'pending' and no
    /// trainer; direct bookings carry the chosen trainer and skip the
    /// allocation flow entirely (matching_status = 'matched' from birth).
    pub async fn create(input: CreateBooking, pool: &PgPool) -> Result<Self> {
        let matching_status = match input.booking_type {
            BookingType::Recommended => MatchingStatus::Pending,
            BookingType::Direct => MatchingStatus::Matched,
        };

        let booking = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO bookings (
                customer_id, booking_type, status, matching_status, trainer_id,
                service_type, session_type, booking_date, start_time,
                duration_minutes, specialty_request, address, max_hourly_rate,
                customer_notes
            )
            VALUES ($1, $2, 'pending', $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            RETURNING *
            "#,
        )
        .bind(input.customer_id)
        .bind(input.booking_type.to_string())
        .bind(matching_status.to_string())
        .bind(input.trainer_id)
        .bind(input.service_type.to_string())
        .bind(input.session_type.to_string())
        .bind(input.booking_date)
        .bind(input.start_time)
        .bind(input.duration_minutes)
        .bind(&input.specialty_request)
        .bind(&input.address)
        .bind(input.max_hourly_rate)
        .bind(&input.customer_notes)
        .fetch_one(pool)
        .await?;
        Ok(booking)
    }

    // =========================================================================
    // Allocation writes. Every one of these re-verifies its precondition
    // inside the UPDATE itself; zero rows affected means another actor won.
    // =========================================================================

    /// Persist the notify-set and deadline for a recommended booking.
    ///
    /// Guarded so the automated pass runs at most once per booking
    /// (`notified_at IS NULL`). Returns false if matching already started
    /// or the booking is no longer claimable.
    pub async fn begin_matching(
        id: BookingId,
        pending_trainer_ids: &[TrainerId],
        deadline: DateTime<Utc>,
        pool: &PgPool,
    ) -> Result<bool> {
        let uuids: Vec<Uuid> = pending_trainer_ids.iter().map(|t| t.into_uuid()).collect();

        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET pending_trainer_ids = $2,
                notified_at = NOW(),
                auto_match_deadline = $3,
                updated_at = NOW()
            WHERE id = $1
              AND booking_type = 'recommended'
              AND matching_status = 'pending'
              AND trainer_id IS NULL
              AND notified_at IS NULL
            "#,
        )
        .bind(id)
        .bind(&uuids)
        .bind(deadline)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Atomic claim for the trainer-accept path.
    ///
    /// The race is decided here: the WHERE clause re-checks that the
    /// booking is still unclaimed in the same round trip as the mutation,
    /// so of N concurrent acceptors exactly one gets a row back. `None`
    /// means the caller lost.
    pub async fn claim_for_trainer(
        id: BookingId,
        trainer_id: TrainerId,
        price_per_person: Decimal,
        total_price: Decimal,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let booking = sqlx::query_as::<_, Self>(
            r#"
            UPDATE bookings
            SET trainer_id = $2,
                matching_status = 'approved',
                status = 'confirmed',
                trainer_confirmed_at = NOW(),
                price_per_person = $3,
                total_price = $4,
                updated_at = NOW()
            WHERE id = $1
              AND matching_status = 'pending'
              AND trainer_id IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(trainer_id)
        .bind(price_per_person)
        .bind(total_price)
        .fetch_optional(pool)
        .await?;
        Ok(booking)
    }

    /// Atomic claim for the admin-assign path.
    ///
    /// Admins are the sole intended writer once a booking is in fallback,
    /// but a stale trainer accept can still race until the row is claimed,
    /// so this carries the same predicate as `claim_for_trainer`.
    pub async fn assign_by_admin(
        id: BookingId,
        trainer_id: TrainerId,
        admin_id: MemberId,
        price_per_person: Decimal,
        total_price: Decimal,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let booking = sqlx::query_as::<_, Self>(
            r#"
            UPDATE bookings
            SET trainer_id = $2,
                matching_status = 'matched',
                status = 'pending',
                admin_matched_at = NOW(),
                admin_matched_by = $3,
                price_per_person = $4,
                total_price = $5,
                updated_at = NOW()
            WHERE id = $1
              AND matching_status = 'pending'
              AND trainer_id IS NULL
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(trainer_id)
        .bind(admin_id)
        .bind(price_per_person)
        .bind(total_price)
        .fetch_optional(pool)
        .await?;
        Ok(booking)
    }

    /// Hand one booking to manual admin matching immediately
    /// (used when the selector finds no candidates to notify).
    pub async fn flag_for_admin(id: BookingId, pool: &PgPool) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE bookings
            SET fallback_to_admin = TRUE,
                admin_notified_at = NOW(),
                updated_at = NOW()
            WHERE id = $1
              AND booking_type = 'recommended'
              AND matching_status = 'pending'
              AND trainer_id IS NULL
              AND fallback_to_admin = FALSE
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Flip all overdue pending bookings to admin fallback.
    ///
    /// Contract of the timeout sweep: deadline elapsed AND matching_status
    /// still pending AND trainer_id still null. Returns the flagged rows.
    pub async fn flag_overdue_for_admin(pool: &PgPool) -> Result<Vec<Self>> {
        let bookings = sqlx::query_as::<_, Self>(
            r#"
            UPDATE bookings
            SET fallback_to_admin = TRUE,
                admin_notified_at = NOW(),
                updated_at = NOW()
            WHERE booking_type = 'recommended'
              AND matching_status = 'pending'
              AND trainer_id IS NULL
              AND fallback_to_admin = FALSE
              AND auto_match_deadline IS NOT NULL
              AND auto_match_deadline < NOW()
            RETURNING *
            "#,
        )
        .fetch_all(pool)
        .await?;
        Ok(bookings)
    }

    /// Cancel a booking. Terminal, independent of matching_status.
    pub async fn cancel(id: BookingId, pool: &PgPool) -> Result<Self> {
        let booking = sqlx::query_as::<_, Self>(
            "UPDATE bookings SET status = 'cancelled', updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_one(pool)
        .await?;
        Ok(booking)
    }

    // =========================================================================
    // Monitoring counts (admin overview, read-only)
    // =========================================================================

    /// Recommended bookings still waiting on the automated race
    pub async fn count_awaiting_match(pool: &PgPool) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM bookings
            WHERE booking_type = 'recommended'
              AND matching_status = 'pending'
              AND fallback_to_admin = FALSE
              AND status <> 'cancelled'
            "#,
        )
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Recommended bookings that timed out and await manual matching
    pub async fn count_fallback(pool: &PgPool) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM bookings
            WHERE booking_type = 'recommended'
              AND matching_status = 'pending'
              AND fallback_to_admin = TRUE
              AND status <> 'cancelled'
            "#,
        )
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Recommended bookings matched since a cutoff (either path)
    pub async fn count_matched_since(cutoff: DateTime<Utc>, pool: &PgPool) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM bookings
            WHERE booking_type = 'recommended'
              AND matching_status IN ('matched', 'approved')
              AND COALESCE(trainer_confirmed_at, admin_matched_at) >= $1
            "#,
        )
        .bind(cutoff)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// All recommended bookings
    pub async fn count_recommended(pool: &PgPool) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM bookings WHERE booking_type = 'recommended'",
        )
        .fetch_one(pool)
        .await?;
        Ok(count)
    }
}
