//! Application configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use fibroguard_core::DomainError;
use fibroguard_core::domain::{
    DEFAULT_MAX_REQUESTS, DEFAULT_MESSAGE, DEFAULT_STATUS_CODE, DEFAULT_WINDOW, RateLimitConfig,
};

use crate::background::SchedulerConfig;
use crate::telemetry::TelemetryConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub rate_limit: RateLimitSettings,
    pub scheduler: SchedulerConfig,
    pub telemetry: TelemetryConfig,
}

/// Rate limiting as applied to the `/api` routes.
#[derive(Debug, Clone)]
pub struct RateLimitSettings {
    /// When false the middleware is not mounted at all.
    pub enabled: bool,
    pub policy: RateLimitConfig,
    /// How often expired records are swept.
    pub sweep_interval: Duration,
}

impl Default for RateLimitSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            policy: RateLimitConfig::default(),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT").unwrap_or(8080),
            rate_limit: RateLimitSettings::from_env(),
            scheduler: SchedulerConfig::from_env(),
            telemetry: TelemetryConfig::from_env(),
        }
    }

    /// Check the loaded values before anything is started.
    pub fn validate(&self) -> Result<(), DomainError> {
        self.rate_limit.policy.validate()?;

        if self.rate_limit.sweep_interval.is_zero() {
            return Err(DomainError::Validation(
                "RATE_LIMIT_SWEEP_INTERVAL_SECS must be greater than zero".to_string(),
            ));
        }
        if self.rate_limit.sweep_interval > self.rate_limit.policy.window {
            tracing::warn!(
                sweep_interval_secs = self.rate_limit.sweep_interval.as_secs(),
                window_ms = self.rate_limit.policy.window_millis(),
                "Sweep interval is longer than the rate limit window"
            );
        }
        Ok(())
    }
}

impl RateLimitSettings {
    pub fn from_env() -> Self {
        Self {
            enabled: flag_var("RATE_LIMIT_ENABLED"),
            policy: RateLimitConfig {
                window: parse_var("RATE_LIMIT_WINDOW_MS")
                    .map(Duration::from_millis)
                    .unwrap_or(DEFAULT_WINDOW),
                max_requests: parse_var("RATE_LIMIT_MAX_REQUESTS").unwrap_or(DEFAULT_MAX_REQUESTS),
                message: env::var("RATE_LIMIT_MESSAGE")
                    .ok()
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_MESSAGE.to_string()),
                status_code: parse_var("RATE_LIMIT_STATUS_CODE").unwrap_or(DEFAULT_STATUS_CODE),
            },
            sweep_interval: Duration::from_secs(
                parse_var("RATE_LIMIT_SWEEP_INTERVAL_SECS").unwrap_or(60),
            ),
        }
    }
}

/// Read and parse a variable; missing or malformed values yield `None`.
fn parse_var<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.trim().parse().ok())
}

/// Boolean switch that is on unless explicitly set to `false` or `0`.
pub(crate) fn flag_var(key: &str) -> bool {
    env::var(key)
        .map(|v| v != "false" && v != "0")
        .unwrap_or(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings_validate() {
        let config = AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            rate_limit: RateLimitSettings::default(),
            scheduler: SchedulerConfig::default(),
            telemetry: TelemetryConfig::default(),
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_sweep_interval_is_rejected() {
        let config = AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            rate_limit: RateLimitSettings {
                sweep_interval: Duration::ZERO,
                ..RateLimitSettings::default()
            },
            scheduler: SchedulerConfig::default(),
            telemetry: TelemetryConfig::default(),
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_policy_is_rejected() {
        let config = AppConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            rate_limit: RateLimitSettings {
                policy: RateLimitConfig::default().with_max_requests(0),
                ..RateLimitSettings::default()
            },
            scheduler: SchedulerConfig::default(),
            telemetry: TelemetryConfig::default(),
        };
        assert!(matches!(
            config.validate(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_parse_var_falls_back_on_garbage() {
        // Unique names keep this independent of the process environment.
        unsafe {
            env::set_var("FIBROGUARD_TEST_PORT_OK", " 9000 ");
            env::set_var("FIBROGUARD_TEST_PORT_BAD", "ninety");
        }
        assert_eq!(parse_var::<u16>("FIBROGUARD_TEST_PORT_OK"), Some(9000));
        assert_eq!(parse_var::<u16>("FIBROGUARD_TEST_PORT_BAD"), None);
        assert_eq!(parse_var::<u16>("FIBROGUARD_TEST_PORT_MISSING"), None);
    }

    #[test]
    fn test_flag_var() {
        unsafe {
            env::set_var("FIBROGUARD_TEST_FLAG_OFF", "false");
            env::set_var("FIBROGUARD_TEST_FLAG_ZERO", "0");
            env::set_var("FIBROGUARD_TEST_FLAG_ON", "yes");
        }
        assert!(!flag_var("FIBROGUARD_TEST_FLAG_OFF"));
        assert!(!flag_var("FIBROGUARD_TEST_FLAG_ZERO"));
        assert!(flag_var("FIBROGUARD_TEST_FLAG_ON"));
        assert!(flag_var("FIBROGUARD_TEST_FLAG_MISSING"));
    }
}
