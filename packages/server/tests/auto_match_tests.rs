//! Integration tests for the automated candidate-notify pass.

mod common;

use crate::common::*;
use chrono::Utc;
use test_context::test_context;

use server_core::domains::bookings::models::Booking;
use server_core::domains::matching::actions::start_auto_match;
use server_core::domains::matching::MatchingError;
use server_core::domains::notifications::Notification;

#[test_context(TestHarness)]
#[tokio::test]
async fn auto_match_persists_a_ranked_within_budget_notify_set(ctx: &TestHarness) {
    let deps = ctx.deps();
    let (_, customer) = create_customer_fixture(&ctx.db_pool).await;
    // Booking: home_visit, 균형감각, 강남구, budget ceiling 100,000
    let booking = create_recommended_booking(customer.id, &ctx.db_pool).await;

    // Strong candidate: specialty + area match
    let (_, strong) = create_trainer_fixture(
        TrainerOpts {
            name: "Strong",
            specialties: vec!["균형감각 훈련".to_string()],
            service_areas: vec!["강남구".to_string()],
            years_experience: 5,
            ..Default::default()
        },
        &ctx.db_pool,
    )
    .await;

    // Weaker candidate: cheap but no specialty/area match
    let (_, weak) = create_trainer_fixture(
        TrainerOpts {
            name: "Weak",
            hourly_rate: 70_000,
            ..Default::default()
        },
        &ctx.db_pool,
    )
    .await;

    // Over the booking's budget: kept for the admin view, never notified
    let (_, over_budget) = create_trainer_fixture(
        TrainerOpts {
            name: "Premium",
            hourly_rate: 150_000,
            ..Default::default()
        },
        &ctx.db_pool,
    )
    .await;

    // Not verified: not eligible at all
    let (_, unverified) = create_trainer_fixture(
        TrainerOpts {
            name: "Unverified",
            verified: false,
            ..Default::default()
        },
        &ctx.db_pool,
    )
    .await;

    let before = Utc::now();
    let outcome = start_auto_match(booking.id, &deps)
        .await
        .expect("Auto-match should start");

    assert!(!outcome.fallback_to_admin);
    assert_eq!(
        outcome.notified_trainer_ids,
        vec![strong.id, weak.id],
        "notify-set must be ranked and budget-filtered"
    );

    let updated = Booking::find_by_id(booking.id, &ctx.db_pool).await.unwrap();
    assert_eq!(
        updated.pending_trainer_ids,
        vec![strong.id.into_uuid(), weak.id.into_uuid()]
    );
    assert!(updated.notified_at.is_some());
    assert!(!updated
        .pending_trainer_ids
        .contains(over_budget.id.as_uuid()));
    assert!(!updated.pending_trainer_ids.contains(unverified.id.as_uuid()));

    // Deadline lands at the configured 30-minute offset
    let deadline = updated.auto_match_deadline.expect("deadline must be set");
    let offset = deadline - before;
    assert!(offset.num_minutes() >= 29 && offset.num_minutes() <= 31);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn auto_match_records_offer_notifications(ctx: &TestHarness) {
    let deps = ctx.deps();
    let (_, customer) = create_customer_fixture(&ctx.db_pool).await;
    let booking = create_recommended_booking(customer.id, &ctx.db_pool).await;

    let (member, _) = create_trainer_fixture(TrainerOpts::default(), &ctx.db_pool).await;

    start_auto_match(booking.id, &deps)
        .await
        .expect("Auto-match should start");

    // Offer dispatch is fire-and-forget; give it a beat
    ctx.settle().await;

    let notifications = Notification::find_by_member(member.id, &ctx.db_pool)
        .await
        .unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, "match_offer");
    assert_eq!(notifications[0].booking_id, booking.id);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn auto_match_runs_at_most_once_per_booking(ctx: &TestHarness) {
    let deps = ctx.deps();
    let (_, customer) = create_customer_fixture(&ctx.db_pool).await;
    let booking = create_recommended_booking(customer.id, &ctx.db_pool).await;
    create_trainer_fixture(TrainerOpts::default(), &ctx.db_pool).await;

    start_auto_match(booking.id, &deps)
        .await
        .expect("First start succeeds");

    let second = start_auto_match(booking.id, &deps).await;
    assert!(matches!(
        second,
        Err(MatchingError::MatchingAlreadyStarted)
    ));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn auto_match_with_no_candidates_falls_back_to_admin(ctx: &TestHarness) {
    let deps = ctx.deps();
    let (_, customer) = create_customer_fixture(&ctx.db_pool).await;
    let booking = create_recommended_booking(customer.id, &ctx.db_pool).await;

    // Only an over-budget trainer exists: nobody to notify
    create_trainer_fixture(
        TrainerOpts {
            hourly_rate: 999_999,
            ..Default::default()
        },
        &ctx.db_pool,
    )
    .await;

    let outcome = start_auto_match(booking.id, &deps)
        .await
        .expect("Auto-match should still succeed");

    assert!(outcome.fallback_to_admin);
    assert!(outcome.notified_trainer_ids.is_empty());

    let updated = Booking::find_by_id(booking.id, &ctx.db_pool).await.unwrap();
    assert!(updated.fallback_to_admin);
    assert!(updated.admin_notified_at.is_some());
    assert_eq!(updated.matching_status, "pending");
}

#[test_context(TestHarness)]
#[tokio::test]
async fn auto_match_caps_the_notify_set(ctx: &TestHarness) {
    let deps = ctx.deps(); // max_notified_candidates = 5
    let (_, customer) = create_customer_fixture(&ctx.db_pool).await;
    let booking = create_recommended_booking(customer.id, &ctx.db_pool).await;

    for _ in 0..8 {
        create_trainer_fixture(TrainerOpts::default(), &ctx.db_pool).await;
    }

    let outcome = start_auto_match(booking.id, &deps)
        .await
        .expect("Auto-match should start");
    assert_eq!(outcome.notified_trainer_ids.len(), 5);
}
