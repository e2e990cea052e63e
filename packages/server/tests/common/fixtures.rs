//! Shared fixtures for matching integration tests.

use chrono::{Duration, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use server_core::common::{CustomerId, TrainerId, Visitor, VisitorRole};
use server_core::domains::bookings::models::{
    Booking, BookingType, CreateBooking, ServiceType, SessionType,
};
use server_core::domains::customers::models::customer::{CreateCustomer, Customer};
use server_core::domains::members::models::member::{CreateMember, Member};
use server_core::domains::trainers::models::trainer::{CreateTrainer, Trainer};

fn unique_phone() -> String {
    format!("+82-10-{}", Uuid::new_v4())
}

pub async fn create_member(role: &str, pool: &PgPool) -> Member {
    Member::create(
        CreateMember {
            phone_number: unique_phone(),
            display_name: format!("{} user", role),
            role: role.to_string(),
            push_token: None,
        },
        pool,
    )
    .await
    .expect("Failed to create member")
}

pub async fn create_customer_fixture(pool: &PgPool) -> (Member, Customer) {
    let member = create_member("member", pool).await;
    let customer = Customer::create(
        CreateCustomer {
            member_id: member.id,
            name: "김영희".to_string(),
            birth_year: Some(1952),
            address: Some("서울 강남구 역삼동".to_string()),
            health_notes: None,
        },
        pool,
    )
    .await
    .expect("Failed to create customer");
    (member, customer)
}

/// Options for trainer fixtures. Defaults make a verified, active
/// home-visit trainer at 90,000/hour.
pub struct TrainerOpts {
    pub name: &'static str,
    pub hourly_rate: i64,
    pub specialties: Vec<String>,
    pub service_areas: Vec<String>,
    pub certifications: Vec<String>,
    pub years_experience: i32,
    pub verified: bool,
}

impl Default for TrainerOpts {
    fn default() -> Self {
        Self {
            name: "Trainer",
            hourly_rate: 90_000,
            specialties: vec![],
            service_areas: vec![],
            certifications: vec![],
            years_experience: 0,
            verified: true,
        }
    }
}

pub async fn create_trainer_fixture(opts: TrainerOpts, pool: &PgPool) -> (Member, Trainer) {
    let member = create_member("trainer", pool).await;
    let trainer = Trainer::create(
        CreateTrainer {
            member_id: member.id,
            name: opts.name.to_string(),
            bio: None,
            profile_image_url: None,
            home_visit_available: true,
            center_visit_available: true,
            online_available: false,
            specialties: opts.specialties,
            service_areas: opts.service_areas,
            certifications: opts.certifications,
            years_experience: opts.years_experience,
            hourly_rate: Decimal::from(opts.hourly_rate),
        },
        pool,
    )
    .await
    .expect("Failed to create trainer");

    let trainer = if opts.verified {
        Trainer::set_verified(trainer.id, true, pool)
            .await
            .expect("Failed to verify trainer")
    } else {
        trainer
    };

    (member, trainer)
}

/// A recommended booking for tomorrow with a 100,000 budget ceiling.
pub async fn create_recommended_booking(customer_id: CustomerId, pool: &PgPool) -> Booking {
    Booking::create(
        CreateBooking {
            customer_id,
            booking_type: BookingType::Recommended,
            service_type: ServiceType::HomeVisit,
            session_type: SessionType::TwoOnOne,
            booking_date: (Utc::now() + Duration::days(1)).date_naive(),
            start_time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            duration_minutes: 60,
            specialty_request: Some("균형감각".to_string()),
            address: Some("서울 강남구 역삼동 123".to_string()),
            max_hourly_rate: Some(Decimal::from(100_000)),
            customer_notes: None,
            trainer_id: None,
        },
        pool,
    )
    .await
    .expect("Failed to create booking")
}

/// Put a booking into the racing state with the given notify-set and a
/// deadline 30 minutes out.
pub async fn offer_to_trainers(booking: &Booking, trainer_ids: &[TrainerId], pool: &PgPool) {
    let started = Booking::begin_matching(
        booking.id,
        trainer_ids,
        Utc::now() + Duration::minutes(30),
        pool,
    )
    .await
    .expect("Failed to begin matching");
    assert!(started, "begin_matching should succeed on a fresh booking");
}

pub fn trainer_visitor(member: &Member) -> Visitor {
    Visitor::authenticated(member.id, VisitorRole::Trainer)
}

pub async fn admin_visitor(pool: &PgPool) -> Visitor {
    let member = create_member("admin", pool).await;
    Visitor::authenticated(member.id, VisitorRole::Admin)
}
