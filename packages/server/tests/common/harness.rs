//! Test harness with testcontainers for integration testing.
//!
//! A single Postgres container is shared across the whole test run; each
//! test gets its own freshly-migrated database on it. The candidate
//! selector scans the global trainer pool, so tests must not see each
//! other's fixtures.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use test_context::AsyncTestContext;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;
use uuid::Uuid;

use server_core::config::MatchingConfig;
use server_core::kernel::{NoopPushService, ServerDeps};

/// Shared test infrastructure that persists across all tests.
struct SharedTestInfra {
    base_url: String,
    // Keep the container alive for the entire test run
    _postgres: ContainerAsync<Postgres>,
}

/// Global shared infrastructure - initialized once, reused by all tests.
static SHARED_INFRA: OnceCell<SharedTestInfra> = OnceCell::const_new();

impl SharedTestInfra {
    async fn init() -> Result<Self> {
        // Initialize tracing subscriber to respect RUST_LOG environment variable.
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let postgres = Postgres::default()
            .with_tag("16")
            .with_cmd(["-c", "max_connections=200"])
            .start()
            .await
            .context("Failed to start Postgres container")?;

        let pg_host = postgres.get_host().await?;
        let pg_port = postgres.get_host_port_ipv4(5432).await?;
        let base_url = format!("postgresql://postgres:postgres@{}:{}", pg_host, pg_port);

        Ok(Self {
            base_url,
            _postgres: postgres,
        })
    }

    async fn get() -> &'static Self {
        SHARED_INFRA
            .get_or_init(|| async {
                Self::init()
                    .await
                    .expect("Failed to initialize shared test infrastructure")
            })
            .await
    }
}

/// Test harness that manages test infrastructure.
///
/// Each test gets an isolated, freshly-migrated database.
pub struct TestHarness {
    /// Database pool - use this for test fixtures.
    pub db_pool: PgPool,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        Self::new().await.expect("Failed to create test harness")
    }

    async fn teardown(self) {
        // Database pool is automatically dropped; the throwaway database
        // stays on the container and dies with it.
    }
}

impl TestHarness {
    pub async fn new() -> Result<Self> {
        let infra = SharedTestInfra::get().await;

        // Carve out a private database for this test
        let db_name = format!("test_{}", Uuid::new_v4().simple());
        let admin_pool = PgPool::connect(&format!("{}/postgres", infra.base_url))
            .await
            .context("Failed to connect to Postgres")?;
        sqlx::query(&format!(r#"CREATE DATABASE "{}""#, db_name))
            .execute(&admin_pool)
            .await
            .context("Failed to create test database")?;
        admin_pool.close().await;

        let db_pool = PgPool::connect(&format!("{}/{}", infra.base_url, db_name))
            .await
            .context("Failed to connect to test database")?;

        sqlx::migrate!("./migrations")
            .run(&db_pool)
            .await
            .context("Failed to run migrations")?;

        Ok(Self { db_pool })
    }

    /// Server dependencies with push delivery suppressed.
    pub fn deps(&self) -> ServerDeps {
        self.deps_with_matching(MatchingConfig::default())
    }

    /// Server dependencies with a custom matching configuration.
    pub fn deps_with_matching(&self, matching: MatchingConfig) -> ServerDeps {
        ServerDeps::new(self.db_pool.clone(), Arc::new(NoopPushService), matching)
    }

    /// Wait for fire-and-forget effects (notification spawns) to settle.
    pub async fn settle(&self) {
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }
}
