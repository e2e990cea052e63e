//! Application setup and server configuration.

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method,
    },
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::kernel::ServerDeps;
use crate::server::middleware::identity_middleware;
use crate::server::routes::{
    accept_handler, admin_cancel_handler, admin_match_handler, auto_match_handler,
    booking_handler, candidates_handler, create_booking_handler, decline_handler,
    fallback_queue_handler, health_handler, overview_handler, responses_handler,
};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub deps: ServerDeps,
}

/// Build the Axum application router
pub fn build_app(deps: ServerDeps) -> Router {
    let app_state = AppState {
        db_pool: deps.db_pool.clone(),
        deps,
    };

    // CORS configuration - allow any origin for development
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE]);

    // Rate limiting: 10 requests per second per IP with a burst of 20.
    // Accept/decline races are short bursts from distinct trainers, so a
    // per-IP limit never throttles the race itself.
    let rate_limit_config = std::sync::Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .use_headers()
            .finish()
            .expect("Rate limiter configuration is valid and should never fail"),
    );

    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config,
    };

    let api = Router::new()
        // Customer-facing bookings
        .route("/bookings", post(create_booking_handler))
        .route("/bookings/:id", get(booking_handler))
        // Trainer race endpoints
        .route("/bookings/:id/accept", post(accept_handler))
        .route("/bookings/:id/decline", post(decline_handler))
        // Payment-completion hook (internal)
        .route("/internal/bookings/:id/auto-match", post(auto_match_handler))
        // Admin manual matching and monitoring
        .route("/admin/bookings/:id/match", post(admin_match_handler))
        .route("/admin/bookings/:id/cancel", post(admin_cancel_handler))
        .route("/admin/bookings/:id/candidates", get(candidates_handler))
        .route("/admin/bookings/:id/responses", get(responses_handler))
        .route("/admin/matching/overview", get(overview_handler))
        .route("/admin/matching/fallback-queue", get(fallback_queue_handler))
        .layer(rate_limit_layer);

    api
        // Health check (no rate limit)
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(identity_middleware))
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
