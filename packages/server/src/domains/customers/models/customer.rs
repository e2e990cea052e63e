use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{CustomerId, MemberId};

/// Customer model - senior clients (or their guardians) who book sessions
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Customer {
    pub id: CustomerId,
    pub member_id: MemberId,
    pub name: String,
    pub birth_year: Option<i32>,
    pub address: Option<String>,
    pub health_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new customer
#[derive(Debug, Clone)]
pub struct CreateCustomer {
    pub member_id: MemberId,
    pub name: String,
    pub birth_year: Option<i32>,
    pub address: Option<String>,
    pub health_notes: Option<String>,
}

impl Customer {
    /// Find customer by ID
    pub async fn find_by_id(id: CustomerId, pool: &PgPool) -> Result<Self> {
        let customer = sqlx::query_as::<_, Self>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_one(pool)
            .await?;
        Ok(customer)
    }

    /// Find customer by ID, returning None if not found
    pub async fn find_by_id_optional(id: CustomerId, pool: &PgPool) -> Result<Option<Self>> {
        let customer = sqlx::query_as::<_, Self>("SELECT * FROM customers WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(customer)
    }

    /// Find customer by the owning member ID
    pub async fn find_by_member_id(member_id: MemberId, pool: &PgPool) -> Result<Option<Self>> {
        let customer = sqlx::query_as::<_, Self>("SELECT * FROM customers WHERE member_id = $1")
            .bind(member_id)
            .fetch_optional(pool)
            .await?;
        Ok(customer)
    }

    /// Create a new customer
    pub async fn create(input: CreateCustomer, pool: &PgPool) -> Result<Self> {
        let customer = sqlx::query_as::<_, Self>(
            r#"
            INSERT INTO customers (member_id, name, birth_year, address, health_notes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(input.member_id)
        .bind(&input.name)
        .bind(input.birth_year)
        .bind(&input.address)
        .bind(&input.health_notes)
        .fetch_one(pool)
        .await?;
        Ok(customer)
    }
}
