// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Business logic (like "pick match candidates") lives in domain functions
// that use these traits.

use anyhow::Result;
use async_trait::async_trait;

// =============================================================================
// Push notifications (Infrastructure - delivery transport)
// =============================================================================

#[async_trait]
pub trait BasePushNotificationService: Send + Sync {
    /// Send a push notification to a device push token.
    ///
    /// `data` carries the deep-link payload the mobile app uses for routing.
    async fn send(
        &self,
        push_token: &str,
        title: &str,
        body: &str,
        data: serde_json::Value,
    ) -> Result<()>;
}
