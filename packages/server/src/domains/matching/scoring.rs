//! Pure candidate scoring for trainer auto-matching.
//!
//! These functions contain NO side effects - they implement the business
//! logic for ranking eligible trainers against a booking's requirements.
//! Callers decide how many top-ranked candidates to notify (automated
//! pass) or display (admin manual pass).
//!
//! Scoring is an additive point system with no learned weights. Each
//! awarded signal also produces a human-readable match reason for the
//! admin view.

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domains::bookings::models::{Booking, ServiceType, SessionType};
use crate::domains::trainers::Trainer;

/// Points for supporting the requested service type
pub const SERVICE_TYPE_POINTS: i32 = 30;
/// Points per matched specialty keyword
pub const SPECIALTY_POINTS_PER_KEYWORD: i32 = 20;
/// Points for covering the requested address
pub const SERVICE_AREA_POINTS: i32 = 25;
/// Experience bonus: 2 points per year, capped
pub const EXPERIENCE_POINTS_PER_YEAR: i32 = 2;
pub const EXPERIENCE_POINTS_CAP: i32 = 10;
/// Points per certification (no cap)
pub const CERTIFICATION_POINTS: i32 = 3;

/// Requirement snapshot the scorer consumes, extracted from a booking.
#[derive(Debug, Clone)]
pub struct MatchRequirements {
    pub service_type: ServiceType,
    pub session_type: SessionType,
    /// Requested specialty keywords, free text (split on comma/whitespace).
    pub specialty: Option<String>,
    /// Requested address for service-area matching.
    pub address: Option<String>,
    /// Budget ceiling for the notify-set. Trainers above it are kept for
    /// the admin view but flagged out of the automated pass.
    pub max_hourly_rate: Decimal,
}

impl MatchRequirements {
    /// Build a requirement snapshot from a booking, falling back to the
    /// configured default budget ceiling when the booking carries none.
    pub fn from_booking(booking: &Booking, default_max_hourly_rate: Decimal) -> Result<Self> {
        Ok(Self {
            service_type: booking.service_type()?,
            session_type: booking.session_type()?,
            specialty: booking.specialty_request.clone(),
            address: booking.address.clone(),
            max_hourly_rate: booking.max_hourly_rate.unwrap_or(default_max_hourly_rate),
        })
    }
}

/// A trainer with their computed match score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredTrainer {
    pub trainer: Trainer,
    pub score: i32,
    pub match_reasons: Vec<String>,
    pub is_within_budget: bool,
    /// Workload at scoring time (active future bookings), kept for the
    /// tie-break and the admin view.
    pub active_bookings: i64,
}

/// Score one trainer against the requirements.
///
/// `active_bookings` is the trainer's current workload: bookings with
/// status pending/confirmed on a future date (derived by the caller).
pub fn score_trainer(
    requirements: &MatchRequirements,
    trainer: &Trainer,
    active_bookings: i64,
) -> ScoredTrainer {
    let mut score = 0;
    let mut match_reasons = Vec::new();

    // Service-type match
    if trainer.supports_service_type(requirements.service_type) {
        score += SERVICE_TYPE_POINTS;
        match_reasons.push(format!("Offers {} sessions", requirements.service_type));
    }

    // Specialty keywords
    if let Some(specialty) = &requirements.specialty {
        let matched = matched_specialty_keywords(specialty, &trainer.specialties);
        if !matched.is_empty() {
            score += SPECIALTY_POINTS_PER_KEYWORD * matched.len() as i32;
            match_reasons.push(format!("Specialty match: {}", matched.join(", ")));
        }
    }

    // Service area
    if let Some(address) = &requirements.address {
        if let Some(area) = matched_service_area(address, &trainer.service_areas) {
            score += SERVICE_AREA_POINTS;
            match_reasons.push(format!("Covers {}", area));
        }
    }

    // Experience (capped bonus)
    if trainer.years_experience > 0 {
        let bonus =
            (trainer.years_experience * EXPERIENCE_POINTS_PER_YEAR).min(EXPERIENCE_POINTS_CAP);
        score += bonus;
        match_reasons.push(format!("{} years of experience", trainer.years_experience));
    }

    // Certifications (no cap)
    if !trainer.certifications.is_empty() {
        score += CERTIFICATION_POINTS * trainer.certifications.len() as i32;
        match_reasons.push(format!("{} certification(s)", trainer.certifications.len()));
    }

    // Price competitiveness against the budget ceiling
    let price_points = price_points(trainer.hourly_rate, requirements.max_hourly_rate);
    score += price_points;
    if price_points >= 15 {
        match_reasons.push("Rate well under budget".to_string());
    } else if price_points >= 10 {
        match_reasons.push("Rate within budget".to_string());
    }

    // Workload: freer trainers score higher (load balancing)
    score += workload_points(active_bookings);
    if active_bookings == 0 {
        match_reasons.push("No upcoming bookings".to_string());
    } else if active_bookings <= 2 {
        match_reasons.push("Light schedule".to_string());
    }

    ScoredTrainer {
        trainer: trainer.clone(),
        score,
        match_reasons,
        is_within_budget: trainer.hourly_rate <= requirements.max_hourly_rate,
        active_bookings,
    }
}

/// Score and rank a candidate pool, descending.
///
/// Tie-break: equal scores order by workload ascending (freer trainer
/// first), then trainer id ascending, so the ranking never depends on
/// storage iteration order.
pub fn rank_candidates(
    requirements: &MatchRequirements,
    candidates: &[(Trainer, i64)],
) -> Vec<ScoredTrainer> {
    let mut scored: Vec<ScoredTrainer> = candidates
        .iter()
        .map(|(trainer, active)| score_trainer(requirements, trainer, *active))
        .collect();

    scored.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then(a.active_bookings.cmp(&b.active_bookings))
            .then(a.trainer.id.cmp(&b.trainer.id))
    });

    scored
}

/// Requested specialty keywords found as substrings of any trainer specialty.
fn matched_specialty_keywords<'a>(requested: &'a str, specialties: &[String]) -> Vec<&'a str> {
    requested
        .split(|c: char| c == ',' || c.is_whitespace())
        .map(str::trim)
        .filter(|keyword| !keyword.is_empty())
        .filter(|keyword| specialties.iter().any(|s| s.contains(keyword)))
        .collect()
}

/// Simple substring heuristic: the address contains the area, or the area
/// contains the address; the first address token is used as a fallback.
fn matched_service_area<'a>(address: &str, service_areas: &'a [String]) -> Option<&'a str> {
    let address = address.trim();
    if address.is_empty() {
        return None;
    }
    let first_token = address.split_whitespace().next().unwrap_or(address);

    service_areas
        .iter()
        .find(|area| {
            address.contains(area.as_str())
                || area.contains(address)
                || area.contains(first_token)
        })
        .map(String::as_str)
}

/// Price competitiveness tiers: rate / max <= 0.8 / 1.0 / 1.2 / above.
fn price_points(hourly_rate: Decimal, max_hourly_rate: Decimal) -> i32 {
    if max_hourly_rate <= Decimal::ZERO {
        return 0;
    }
    // Integer-safe ratio comparisons: rate*10 <=> max*{8,10,12}
    let rate_x10 = hourly_rate * Decimal::from(10);
    if rate_x10 <= max_hourly_rate * Decimal::from(8) {
        15
    } else if hourly_rate <= max_hourly_rate {
        10
    } else if rate_x10 <= max_hourly_rate * Decimal::from(12) {
        5
    } else {
        0
    }
}

/// Load-balancing tiers over active future bookings.
fn workload_points(active_bookings: i64) -> i32 {
    match active_bookings {
        0 => 20,
        1..=2 => 15,
        3..=4 => 10,
        5..=6 => 5,
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{MemberId, TrainerId};
    use chrono::Utc;

    fn trainer(hourly_rate: i64) -> Trainer {
        Trainer {
            id: TrainerId::new(),
            member_id: MemberId::new(),
            name: "Test Trainer".to_string(),
            bio: None,
            profile_image_url: None,
            is_verified: true,
            is_active: true,
            home_visit_available: true,
            center_visit_available: false,
            online_available: false,
            specialties: vec![],
            service_areas: vec![],
            certifications: vec![],
            years_experience: 0,
            hourly_rate: Decimal::from(hourly_rate),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn requirements() -> MatchRequirements {
        MatchRequirements {
            service_type: ServiceType::HomeVisit,
            session_type: SessionType::TwoOnOne,
            specialty: None,
            address: None,
            max_hourly_rate: Decimal::from(100_000),
        }
    }

    #[test]
    fn test_service_type_match_scores_30() {
        let req = requirements();
        let t = trainer(100_000);
        // 30 service + 10 price (at budget) + 20 workload
        let scored = score_trainer(&req, &t, 0);
        assert_eq!(scored.score, 60);
        assert!(scored
            .match_reasons
            .iter()
            .any(|r| r.contains("home_visit")));
    }

    #[test]
    fn test_unsupported_service_type_scores_no_service_points() {
        let req = MatchRequirements {
            service_type: ServiceType::Online,
            ..requirements()
        };
        let t = trainer(100_000);
        let scored = score_trainer(&req, &t, 0);
        // No service points: 10 price + 20 workload only
        assert_eq!(scored.score, 30);
    }

    #[test]
    fn test_specialty_keywords_score_20_each() {
        let req = MatchRequirements {
            specialty: Some("균형감각, 재활운동".to_string()),
            ..requirements()
        };
        let mut t = trainer(100_000);
        t.specialties = vec!["균형감각 훈련".to_string(), "시니어 재활운동".to_string()];
        let scored = score_trainer(&req, &t, 0);
        // 30 service + 40 specialty + 10 price + 20 workload
        assert_eq!(scored.score, 100);
        assert!(scored
            .match_reasons
            .iter()
            .any(|r| r.contains("균형감각") && r.contains("재활운동")));
    }

    #[test]
    fn test_unmatched_specialty_scores_nothing() {
        let req = MatchRequirements {
            specialty: Some("수중운동".to_string()),
            ..requirements()
        };
        let mut t = trainer(100_000);
        t.specialties = vec!["근력강화".to_string()];
        let scored = score_trainer(&req, &t, 0);
        assert_eq!(scored.score, 60);
    }

    #[test]
    fn test_service_area_substring_both_directions() {
        let mut t = trainer(100_000);
        t.service_areas = vec!["강남구".to_string()];

        // Address contains the area
        let req = MatchRequirements {
            address: Some("서울 강남구 역삼동 123".to_string()),
            ..requirements()
        };
        assert_eq!(score_trainer(&req, &t, 0).score, 85);

        // Area contains the address
        let req = MatchRequirements {
            address: Some("강남".to_string()),
            ..requirements()
        };
        assert_eq!(score_trainer(&req, &t, 0).score, 85);
    }

    #[test]
    fn test_service_area_first_token_fallback() {
        let mut t = trainer(100_000);
        t.service_areas = vec!["수원시 전체".to_string()];
        let req = MatchRequirements {
            address: Some("수원시 팔달구 행궁동".to_string()),
            ..requirements()
        };
        // Full address is not a substring either way; the first token is
        let scored = score_trainer(&req, &t, 0);
        assert_eq!(scored.score, 85);
        assert!(scored.match_reasons.iter().any(|r| r.contains("수원시")));
    }

    #[test]
    fn test_experience_bonus_is_capped_at_10() {
        let req = requirements();

        let mut t = trainer(100_000);
        t.years_experience = 3;
        assert_eq!(score_trainer(&req, &t, 0).score, 66); // 30 + 6 + 10 + 20

        t.years_experience = 5;
        assert_eq!(score_trainer(&req, &t, 0).score, 70); // cap reached

        t.years_experience = 20;
        assert_eq!(score_trainer(&req, &t, 0).score, 70); // still capped
    }

    #[test]
    fn test_certifications_score_3_each_uncapped() {
        let req = requirements();
        let mut t = trainer(100_000);
        t.certifications = (0..10).map(|i| format!("cert-{}", i)).collect();
        // 30 + 30 certs + 10 price + 20 workload
        assert_eq!(score_trainer(&req, &t, 0).score, 90);
    }

    #[test]
    fn test_price_tiers() {
        let req = requirements(); // max 100,000

        assert_eq!(score_trainer(&req, &trainer(80_000), 0).score, 65); // <= 0.8: +15
        assert_eq!(score_trainer(&req, &trainer(80_001), 0).score, 60); // <= 1.0: +10
        assert_eq!(score_trainer(&req, &trainer(100_000), 0).score, 60);
        assert_eq!(score_trainer(&req, &trainer(100_001), 0).score, 55); // <= 1.2: +5
        assert_eq!(score_trainer(&req, &trainer(120_000), 0).score, 55);
        assert_eq!(score_trainer(&req, &trainer(120_001), 0).score, 50); // over: +0
    }

    #[test]
    fn test_workload_tiers() {
        let req = requirements();
        let t = trainer(100_000); // 30 service + 10 price = 40 base

        assert_eq!(score_trainer(&req, &t, 0).score, 60); // +20
        assert_eq!(score_trainer(&req, &t, 1).score, 55); // +15
        assert_eq!(score_trainer(&req, &t, 2).score, 55);
        assert_eq!(score_trainer(&req, &t, 3).score, 50); // +10
        assert_eq!(score_trainer(&req, &t, 4).score, 50);
        assert_eq!(score_trainer(&req, &t, 5).score, 45); // +5
        assert_eq!(score_trainer(&req, &t, 6).score, 45);
        assert_eq!(score_trainer(&req, &t, 7).score, 40); // +0
    }

    #[test]
    fn test_score_is_monotone_in_experience_certs_and_free_time() {
        let req = requirements();
        let base = trainer(90_000);

        // More experience never lowers the score
        let mut more_exp = base.clone();
        more_exp.years_experience = base.years_experience + 3;
        assert!(score_trainer(&req, &more_exp, 2).score >= score_trainer(&req, &base, 2).score);

        // More certifications never lower the score
        let mut more_certs = base.clone();
        more_certs.certifications.push("생활체육지도사".to_string());
        assert!(score_trainer(&req, &more_certs, 2).score >= score_trainer(&req, &base, 2).score);

        // A freer schedule never lowers the score
        assert!(score_trainer(&req, &base, 0).score >= score_trainer(&req, &base, 5).score);
    }

    #[test]
    fn test_budget_partition() {
        let req = requirements(); // max 100,000
        assert!(score_trainer(&req, &trainer(100_000), 0).is_within_budget);
        assert!(!score_trainer(&req, &trainer(100_001), 0).is_within_budget);
    }

    #[test]
    fn test_zero_budget_awards_no_price_points() {
        let req = MatchRequirements {
            max_hourly_rate: Decimal::ZERO,
            ..requirements()
        };
        let scored = score_trainer(&req, &trainer(50_000), 0);
        // 30 service + 20 workload, no price points
        assert_eq!(scored.score, 50);
        assert!(!scored.is_within_budget);
    }

    #[test]
    fn test_specialty_match_outranks_price_advantage() {
        // The spec's example scenario: home_visit, 균형감각, 2:1.
        // T1: specialty match, rate 90,000, no active bookings.
        // T2: no specialty match, cheaper (70,000), 1 active booking.
        let req = MatchRequirements {
            specialty: Some("균형감각".to_string()),
            ..requirements()
        };

        let mut t1 = trainer(90_000);
        t1.specialties = vec!["균형감각".to_string()];
        let mut t2 = trainer(70_000);
        t2.specialties = vec!["근력강화".to_string()];

        let ranked = rank_candidates(&req, &[(t2.clone(), 1), (t1.clone(), 0)]);
        assert_eq!(ranked[0].trainer.id, t1.id);
        // T1: 30 + 20 specialty + 10 price + 20 workload = 80
        assert_eq!(ranked[0].score, 80);
        // T2: 30 + 15 price + 15 workload = 60
        assert_eq!(ranked[1].score, 60);
    }

    #[test]
    fn test_rank_is_descending_by_score() {
        let req = requirements();
        let strong = {
            let mut t = trainer(70_000);
            t.years_experience = 5;
            t
        };
        let weak = trainer(130_000);

        let ranked = rank_candidates(&req, &[(weak.clone(), 0), (strong.clone(), 0)]);
        assert_eq!(ranked[0].trainer.id, strong.id);
        assert!(ranked[0].score > ranked[1].score);
    }

    #[test]
    fn test_tie_breaks_on_workload_then_id() {
        let req = requirements();
        // Same rate, same everything: scores tie unless workload differs
        let a = trainer(100_000);
        let b = trainer(100_000);

        // Workload asc wins the tie: +15 vs +20 differ, so use equal
        // workloads first to hit the id tie-break.
        let ranked = rank_candidates(&req, &[(b.clone(), 1), (a.clone(), 1)]);
        assert_eq!(ranked[0].score, ranked[1].score);
        let expected_first = if a.id < b.id { a.id } else { b.id };
        assert_eq!(ranked[0].trainer.id, expected_first);
    }

    #[test]
    fn test_requirements_from_booking_uses_default_budget() {
        use crate::common::CustomerId;
        use chrono::{NaiveDate, NaiveTime};

        let booking = Booking {
            id: crate::common::BookingId::new(),
            customer_id: CustomerId::new(),
            booking_type: "recommended".to_string(),
            status: "pending".to_string(),
            matching_status: "pending".to_string(),
            trainer_id: None,
            pending_trainer_ids: vec![],
            fallback_to_admin: false,
            auto_match_deadline: None,
            notified_at: None,
            admin_notified_at: None,
            trainer_confirmed_at: None,
            admin_matched_at: None,
            admin_matched_by: None,
            service_type: "home_visit".to_string(),
            session_type: "two_on_one".to_string(),
            booking_date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            duration_minutes: 60,
            specialty_request: Some("균형감각".to_string()),
            address: None,
            max_hourly_rate: None,
            customer_notes: None,
            price_per_person: None,
            total_price: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let req = MatchRequirements::from_booking(&booking, Decimal::from(80_000)).unwrap();
        assert_eq!(req.max_hourly_rate, Decimal::from(80_000));
        assert_eq!(req.service_type, ServiceType::HomeVisit);
        assert_eq!(req.session_type, SessionType::TwoOnOne);
    }
}
