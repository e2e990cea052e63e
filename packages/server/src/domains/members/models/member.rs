use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::MemberId;

/// Member model - auth principals (customers, trainers, admins).
///
/// Identity verification happens upstream at the gateway; this row only
/// carries the profile and push token the server needs.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Member {
    pub id: MemberId,
    pub phone_number: String,
    pub display_name: String,
    pub role: String,
    pub push_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new member
#[derive(Debug, Clone)]
pub struct CreateMember {
    pub phone_number: String,
    pub display_name: String,
    pub role: String,
    pub push_token: Option<String>,
}

impl Member {
    /// Find member by ID
    pub async fn find_by_id(id: MemberId, pool: &PgPool) -> Result<Self> {
        let member = sqlx::query_as::<_, Self>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(member)
    }

    /// Find member by ID, returning None if not found
    pub async fn find_by_id_optional(id: MemberId, pool: &PgPool) -> Result<Option<Self>> {
        let member = sqlx::query_as::<_, Self>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(member)
    }

    /// Create a new member
    pub async fn create(input: CreateMember, pool: &PgPool) -> Result<Self> {
        let member = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO members (phone_number, display_name, role, push_token)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&input.phone_number)
        .bind(&input.display_name)
        .bind(&input.role)
        .bind(&input.push_token)
        .fetch_one(pool)
        .await?;
        Ok(member)
    }

    /// Update a member's push token (set on login from the mobile app)
    pub async fn update_push_token(
        id: MemberId,
        push_token: Option<&str>,
        pool: &PgPool,
    ) -> Result<()> {
        sqlx::query("UPDATE members SET push_token = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(push_token)
            .execute(pool)
            .await?;
        Ok(())
    }
}
