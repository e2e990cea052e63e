//! Matching actions: the public contract of the allocation engine.
//!
//! All interfaces are in-process function calls against the shared store;
//! the HTTP layer is a thin adapter over these.

pub mod mutations;
pub mod queries;

pub use mutations::{
    accept_booking_request, admin_cancel_booking, admin_match_booking, decline_booking_request,
    start_auto_match, AutoMatchOutcome,
};
pub use queries::{
    fallback_queue, match_candidates, match_responses, matching_overview, MatchCandidates,
    MatchingOverview,
};
