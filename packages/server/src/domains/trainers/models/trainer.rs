use std::collections::HashMap;

use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::common::{MemberId, TrainerId};
use crate::domains::bookings::models::ServiceType;

/// Trainer model - the candidate pool for booking allocation
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Trainer {
    pub id: TrainerId,
    pub member_id: MemberId,

    // Profile
    pub name: String,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,

    // Eligibility
    pub is_verified: bool,
    pub is_active: bool,

    // Service modes
    pub home_visit_available: bool,
    pub center_visit_available: bool,
    pub online_available: bool,

    // Scoring attributes
    pub specialties: Vec<String>,
    pub service_areas: Vec<String>,
    pub certifications: Vec<String>,
    pub years_experience: i32,
    pub hourly_rate: Decimal,

    // Timestamps
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new trainer
#[derive(Debug, Clone)]
pub struct CreateTrainer {
    pub member_id: MemberId,
    pub name: String,
    pub bio: Option<String>,
    pub profile_image_url: Option<String>,
    pub home_visit_available: bool,
    pub center_visit_available: bool,
    pub online_available: bool,
    pub specialties: Vec<String>,
    pub service_areas: Vec<String>,
    pub certifications: Vec<String>,
    pub years_experience: i32,
    pub hourly_rate: Decimal,
}

impl Trainer {
    /// Whether this trainer offers the requested service type.
    pub fn supports_service_type(&self, service_type: ServiceType) -> bool {
        match service_type {
            ServiceType::HomeVisit => self.home_visit_available,
            ServiceType::CenterVisit => self.center_visit_available,
            ServiceType::Online => self.online_available,
        }
    }

    /// Find trainer by ID
    pub async fn find_by_id(id: TrainerId, pool: &PgPool) -> Result<Self> {
        let trainer = sqlx::query_as::<_, Self>("SELECT * FROM trainers WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(trainer)
    }

    /// Find trainer by ID, returning None if not found
    pub async fn find_by_id_optional(id: TrainerId, pool: &PgPool) -> Result<Option<Self>> {
        let trainer = sqlx::query_as::<_, Self>("SELECT * FROM trainers WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(trainer)
    }

    /// Find trainer by the owning member ID
    pub async fn find_by_member_id(member_id: MemberId, pool: &PgPool) -> Result<Option<Self>> {
        let trainer = sqlx::query_as::<_, Self>("SELECT * FROM trainers WHERE member_id = $1")
            .bind(member_id)
            .fetch_optional(pool)
            .await?;
        Ok(trainer)
    }

    /// Find the verified, active trainers that offer a service type.
    ///
    /// This is the candidate pool the selector scores for a recommended
    /// booking. Ordering here is irrelevant: ranking is done by the scorer.
    pub async fn find_eligible(service_type: ServiceType, pool: &PgPool) -> Result<Vec<Self>> {
        let trainers = sqlx::query_as::<_, Self>(
            r#"
            SELECT * FROM trainers
            WHERE is_verified = TRUE
              AND is_active = TRUE
              AND (
                    ($1 = 'home_visit' AND home_visit_available)
                 OR ($1 = 'center_visit' AND center_visit_available)
                 OR ($1 = 'online' AND online_available)
              )
            "#,
        )
        .bind(service_type.to_string())
        .fetch_all(pool)
        .await?;
        Ok(trainers)
    }

    /// Current workload for one trainer: bookings still in play
    /// (pending or confirmed) on a future date. Derived, never stored.
    pub async fn count_active_bookings(id: TrainerId, pool: &PgPool) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*) FROM bookings
            WHERE trainer_id = $1
              AND status IN ('pending', 'confirmed')
              AND booking_date >= CURRENT_DATE
            "#,
        )
        .bind(id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Workloads for a batch of trainers in one round trip.
    /// Trainers with no active bookings are absent from the map.
    pub async fn count_active_bookings_for_many(
        ids: &[TrainerId],
        pool: &PgPool,
    ) -> Result<HashMap<TrainerId, i64>> {
        let uuids: Vec<Uuid> = ids.iter().map(|id| id.into_uuid()).collect();

        let rows = sqlx::query_as::<_, (Uuid, i64)>(
            r#"
            SELECT trainer_id, COUNT(*) FROM bookings
            WHERE trainer_id = ANY($1)
              AND status IN ('pending', 'confirmed')
              AND booking_date >= CURRENT_DATE
            GROUP BY trainer_id
            "#,
        )
        .bind(&uuids)
        .fetch_all(pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, count)| (TrainerId::from_uuid(id), count))
            .collect())
    }

    /// Create a new trainer (starts unverified)
    pub async fn create(input: CreateTrainer, pool: &PgPool) -> Result<Self> {
        let trainer = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO trainers (
                member_id, name, bio, profile_image_url,
                home_visit_available, center_visit_available, online_available,
                specialties, service_areas, certifications,
                years_experience, hourly_rate
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(input.member_id)
        .bind(&input.name)
        .bind(&input.bio)
        .bind(&input.profile_image_url)
        .bind(input.home_visit_available)
        .bind(input.center_visit_available)
        .bind(input.online_available)
        .bind(&input.specialties)
        .bind(&input.service_areas)
        .bind(&input.certifications)
        .bind(input.years_experience)
        .bind(input.hourly_rate)
        .fetch_one(pool)
        .await?;
        Ok(trainer)
    }

    /// Verify a trainer (admin moderation)
    pub async fn set_verified(id: TrainerId, verified: bool, pool: &PgPool) -> Result<Self> {
        let trainer = sqlx::query_as::<_, Self>(
            "UPDATE trainers SET is_verified = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(verified)
        .fetch_one(pool)
        .await?;
        Ok(trainer)
    }

    /// Activate or deactivate a trainer (trainer availability toggle)
    pub async fn set_active(id: TrainerId, active: bool, pool: &PgPool) -> Result<Self> {
        let trainer = sqlx::query_as::<_, Self>(
            "UPDATE trainers SET is_active = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(active)
        .fetch_one(pool)
        .await?;
        Ok(trainer)
    }
}
