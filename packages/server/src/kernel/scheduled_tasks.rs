//! Scheduled background tasks using tokio-cron-scheduler.
//!
//! The matching core itself never runs a timer: the auto-match deadline is
//! advisory wall-clock data on the booking row. This sweep is the external
//! collaborator that flips overdue bookings to admin fallback.
//!
//! ```text
//! Scheduler (every minute)
//!     │
//!     └─► Booking::flag_overdue_for_admin()
//!             └─► matching_status still pending AND trainer_id still null
//!                 AND deadline elapsed → fallback_to_admin = true
//! ```

use anyhow::Result;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::domains::bookings::models::Booking;
use crate::kernel::ServerDeps;

/// Start all scheduled tasks
pub async fn start_scheduler(deps: ServerDeps) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    // Auto-match timeout sweep - runs every minute
    let sweep_deps = deps.clone();
    let sweep_job = Job::new_async("0 * * * * *", move |_uuid, _lock| {
        let deps = sweep_deps.clone();
        Box::pin(async move {
            if let Err(e) = run_timeout_sweep(&deps).await {
                tracing::error!("Auto-match timeout sweep failed: {}", e);
            }
        })
    })?;

    scheduler.add(sweep_job).await?;
    scheduler.start().await?;

    tracing::info!("Scheduled tasks started (auto-match timeout sweep every minute)");
    Ok(scheduler)
}

/// Flag recommended bookings whose auto-match deadline elapsed without a
/// winner, handing them to manual admin matching.
///
/// The flip is a single conditional update, so a trainer accept that lands
/// concurrently either claims the booking first (and the sweep skips it)
/// or finds it flagged but still formally claimable until an admin acts.
pub async fn run_timeout_sweep(deps: &ServerDeps) -> Result<()> {
    let flagged = Booking::flag_overdue_for_admin(&deps.db_pool).await?;

    if flagged.is_empty() {
        tracing::debug!("No bookings overdue for admin fallback");
        return Ok(());
    }

    tracing::info!(
        "Flagged {} booking(s) for manual admin matching",
        flagged.len()
    );

    for booking in &flagged {
        tracing::info!(
            booking_id = %booking.id,
            deadline = ?booking.auto_match_deadline,
            "Booking timed out waiting for a trainer accept"
        );
    }

    Ok(())
}
