use anyhow::{Context, Result};
use dotenvy::dotenv;
use rust_decimal::Decimal;
use std::env;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub expo_access_token: Option<String>,
    pub allowed_origins: Vec<String>,
    pub matching: MatchingConfig,
}

/// Knobs for the trainer auto-matching engine
#[derive(Debug, Clone)]
pub struct MatchingConfig {
    /// Minutes a recommended booking waits for a trainer accept before
    /// it is flagged for manual admin matching.
    pub auto_match_timeout_minutes: i64,
    /// How many top-ranked trainers get notified per booking.
    pub max_notified_candidates: usize,
    /// Budget ceiling applied when the booking carries no max_hourly_rate.
    pub default_max_hourly_rate: Decimal,
    /// When true, a trainer who declined a booking can no longer accept it.
    /// The default preserves advisory declines: decline is a logged signal,
    /// not a structural removal from the offer set.
    pub reject_accept_after_decline: bool,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            auto_match_timeout_minutes: 30,
            max_notified_candidates: 5,
            default_max_hourly_rate: Decimal::from(100_000),
            reject_accept_after_decline: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let defaults = MatchingConfig::default();

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            expo_access_token: env::var("EXPO_ACCESS_TOKEN").ok(),
            allowed_origins: env::var("ALLOWED_ORIGINS")
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or_default(),
            matching: MatchingConfig {
                auto_match_timeout_minutes: env::var("MATCHING_TIMEOUT_MINUTES")
                    .ok()
                    .map(|v| v.parse())
                    .transpose()
                    .context("MATCHING_TIMEOUT_MINUTES must be a valid number")?
                    .unwrap_or(defaults.auto_match_timeout_minutes),
                max_notified_candidates: env::var("MATCHING_MAX_CANDIDATES")
                    .ok()
                    .map(|v| v.parse())
                    .transpose()
                    .context("MATCHING_MAX_CANDIDATES must be a valid number")?
                    .unwrap_or(defaults.max_notified_candidates),
                default_max_hourly_rate: env::var("MATCHING_DEFAULT_MAX_HOURLY_RATE")
                    .ok()
                    .map(|v| v.parse())
                    .transpose()
                    .context("MATCHING_DEFAULT_MAX_HOURLY_RATE must be a valid number")?
                    .unwrap_or(defaults.default_max_hourly_rate),
                reject_accept_after_decline: env::var("MATCHING_REJECT_ACCEPT_AFTER_DECLINE")
                    .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                    .unwrap_or(defaults.reject_accept_after_decline),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_defaults() {
        let cfg = MatchingConfig::default();
        assert_eq!(cfg.auto_match_timeout_minutes, 30);
        assert_eq!(cfg.max_notified_candidates, 5);
        assert_eq!(cfg.default_max_hourly_rate, Decimal::from(100_000));
        assert!(!cfg.reject_accept_after_decline);
    }
}
