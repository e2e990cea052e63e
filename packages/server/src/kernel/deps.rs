//! Server dependencies for domain actions (using traits for testability)
//!
//! This module provides the central dependency container passed to all
//! domain actions. External services use trait abstractions so tests can
//! substitute no-op implementations.

use sqlx::PgPool;
use std::sync::Arc;

use crate::config::MatchingConfig;
use crate::kernel::traits::BasePushNotificationService;

/// Server dependencies accessible to domain actions
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    /// Push delivery transport. Fire-and-forget: the matching core never
    /// blocks its own success on a delivery outcome.
    pub push_service: Arc<dyn BasePushNotificationService>,
    pub matching: MatchingConfig,
}

impl ServerDeps {
    pub fn new(
        db_pool: PgPool,
        push_service: Arc<dyn BasePushNotificationService>,
        matching: MatchingConfig,
    ) -> Self {
        Self {
            db_pool,
            push_service,
            matching,
        }
    }
}
