use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{BookingId, MemberId, NotificationId};

/// Notification record - tracks what a member was told about a booking
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Notification {
    pub id: NotificationId,
    pub member_id: MemberId,
    pub booking_id: BookingId,
    pub kind: String,
    pub title: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Record a notification (upsert - ignores duplicates)
    ///
    /// Uses ON CONFLICT DO NOTHING so re-dispatching the same kind for the
    /// same booking-member pair stays idempotent.
    pub async fn record(
        member_id: MemberId,
        booking_id: BookingId,
        kind: &str,
        title: &str,
        body: &str,
        pool: &PgPool,
    ) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO notifications (member_id, booking_id, kind, title, body)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (booking_id, member_id, kind) DO NOTHING
            "#,
        )
        .bind(member_id)
        .bind(booking_id)
        .bind(kind)
        .bind(title)
        .bind(body)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Find all notifications for a member, newest first
    pub async fn find_by_member(member_id: MemberId, pool: &PgPool) -> Result<Vec<Self>> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE member_id = $1 ORDER BY created_at DESC",
        )
        .bind(member_id)
        .fetch_all(pool)
        .await?;

        Ok(notifications)
    }

    /// Find all notifications for a booking, newest first
    pub async fn find_by_booking(booking_id: BookingId, pool: &PgPool) -> Result<Vec<Self>> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE booking_id = $1 ORDER BY created_at DESC",
        )
        .bind(booking_id)
        .fetch_all(pool)
        .await?;

        Ok(notifications)
    }
}
