//! Typed ID definitions for all domain entities.
//!
//! This module defines type aliases for each domain entity, providing
//! compile-time type safety for ID usage throughout the application.

// Re-export the core Id type and version markers
pub use super::id::{Id, V4, V7};

// ============================================================================
// Entity marker types
// ============================================================================

/// Marker type for Member entities (auth principals).
pub struct Member;

/// Marker type for Customer entities.
pub struct Customer;

/// Marker type for Trainer entities.
pub struct Trainer;

/// Marker type for Booking entities.
pub struct Booking;

/// Marker type for TrainerMatchResponse entities (race audit log).
pub struct TrainerMatchResponse;

/// Marker type for Notification entities.
pub struct Notification;

// ============================================================================
// Type aliases - the primary API
// ============================================================================

/// Typed ID for Member entities.
pub type MemberId = Id<Member>;

/// Typed ID for Customer entities.
pub type CustomerId = Id<Customer>;

/// Typed ID for Trainer entities.
pub type TrainerId = Id<Trainer>;

/// Typed ID for Booking entities.
pub type BookingId = Id<Booking>;

/// Typed ID for TrainerMatchResponse entities.
pub type MatchResponseId = Id<TrainerMatchResponse>;

/// Typed ID for Notification entities.
pub type NotificationId = Id<Notification>;
