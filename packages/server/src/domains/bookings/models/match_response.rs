use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{BookingId, MatchResponseId, TrainerId};

/// Outcome recorded for a trainer's response to a booking offer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    Accepted,
    Declined,
    /// The claim attempt lost the race - another trainer (or an admin)
    /// already held the booking.
    TooLate,
}

impl std::fmt::Display for ResponseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResponseType::Accepted => write!(f, "accepted"),
            ResponseType::Declined => write!(f, "declined"),
            ResponseType::TooLate => write!(f, "too_late"),
        }
    }
}

impl std::str::FromStr for ResponseType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "accepted" => Ok(ResponseType::Accepted),
            "declined" => Ok(ResponseType::Declined),
            "too_late" => Ok(ResponseType::TooLate),
            _ => Err(anyhow::anyhow!("Invalid response type: {}", s)),
        }
    }
}

/// Append-only audit record of the allocation race.
///
/// One row per (booking, trainer, attempt) - the durable record of the
/// outcome for every participant, not just the winner. Rows are never
/// updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct TrainerMatchResponse {
    pub id: MatchResponseId,
    pub booking_id: BookingId,
    pub trainer_id: TrainerId,
    pub response_type: String,
    pub decline_reason: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TrainerMatchResponse {
    pub fn response_type(&self) -> Result<ResponseType> {
        self.response_type.parse()
    }

    /// Append a response record
    pub async fn record(
        booking_id: BookingId,
        trainer_id: TrainerId,
        response_type: ResponseType,
        decline_reason: Option<&str>,
        note: Option<&str>,
        pool: &PgPool,
    ) -> Result<Self> {
        let response = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO trainer_match_responses (
                booking_id, trainer_id, response_type, decline_reason, note
            )
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(booking_id)
        .bind(trainer_id)
        .bind(response_type.to_string())
        .bind(decline_reason)
        .bind(note)
        .fetch_one(pool)
        .await?;
        Ok(response)
    }

    /// Full response log for a booking, oldest first
    pub async fn find_by_booking(booking_id: BookingId, pool: &PgPool) -> Result<Vec<Self>> {
        let responses = sqlx::query_as::<_, Self>(
            "SELECT * FROM trainer_match_responses WHERE booking_id = $1 ORDER BY created_at ASC",
        )
        .bind(booking_id)
        .fetch_all(pool)
        .await?;
        Ok(responses)
    }

    /// Whether a trainer has declined this booking at any point
    pub async fn has_declined(
        booking_id: BookingId,
        trainer_id: TrainerId,
        pool: &PgPool,
    ) -> Result<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM trainer_match_responses
            WHERE booking_id = $1 AND trainer_id = $2 AND response_type = 'declined'
            "#,
        )
        .bind(booking_id)
        .bind(trainer_id)
        .fetch_one(pool)
        .await?;
        Ok(count > 0)
    }
}
