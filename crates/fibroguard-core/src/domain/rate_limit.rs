//! Fixed-window rate limiting model.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Default counting window.
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);
/// Default number of admitted requests per window.
pub const DEFAULT_MAX_REQUESTS: u32 = 60;
/// Default rejection message shown to patients.
pub const DEFAULT_MESSAGE: &str = "Te veel verzoeken. Probeer het later opnieuw.";
/// Default status code reported on rejection.
pub const DEFAULT_STATUS_CODE: u16 = 429;

/// Policy applied to a single rate limit check.
///
/// Every field has a default, so callers only override what they need:
/// ```
/// use fibroguard_core::domain::RateLimitConfig;
///
/// let strict = RateLimitConfig::default().with_max_requests(5);
/// assert_eq!(strict.window_millis(), 60_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Length of the counting window.
    pub window: Duration,
    /// Maximum admitted requests per window.
    pub max_requests: u32,
    /// Human-readable rejection reason.
    pub message: String,
    /// Status code to report on rejection.
    pub status_code: u16,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            max_requests: DEFAULT_MAX_REQUESTS,
            message: DEFAULT_MESSAGE.to_string(),
            status_code: DEFAULT_STATUS_CODE,
        }
    }
}

impl RateLimitConfig {
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn with_max_requests(mut self, max_requests: u32) -> Self {
        self.max_requests = max_requests;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_status_code(mut self, status_code: u16) -> Self {
        self.status_code = status_code;
        self
    }

    /// Window length in whole milliseconds, saturating at `u64::MAX`.
    pub fn window_millis(&self) -> u64 {
        u64::try_from(self.window.as_millis()).unwrap_or(u64::MAX)
    }

    /// Reject configurations that could never admit or reset.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.window_millis() == 0 {
            return Err(DomainError::Validation(
                "rate limit window must be at least 1ms".to_string(),
            ));
        }
        if self.max_requests == 0 {
            return Err(DomainError::Validation(
                "rate limit max_requests must be greater than zero".to_string(),
            ));
        }
        if !(400..=599).contains(&self.status_code) {
            return Err(DomainError::Validation(format!(
                "rate limit status code {} is not an error status",
                self.status_code
            )));
        }
        Ok(())
    }
}

/// Per-identifier counter for the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitRecord {
    /// Requests observed in the current window, admitted or not.
    pub count: u32,
    /// Epoch milliseconds at which the window ends.
    pub reset_at: u64,
}

impl RateLimitRecord {
    /// Open an empty window starting at `now`.
    pub fn open(now: u64, config: &RateLimitConfig) -> Self {
        Self {
            count: 0,
            reset_at: now.saturating_add(config.window_millis()),
        }
    }

    /// A record is logically dead once its reset time has been reached.
    pub fn is_expired(&self, now: u64) -> bool {
        now >= self.reset_at
    }

    /// Whole seconds until the window resets, rounded up.
    pub fn reset_seconds(&self, now: u64) -> u64 {
        self.reset_at.saturating_sub(now).div_ceil(1000)
    }

    /// Count one more request. Saturates rather than wrapping.
    pub fn hit(&mut self) {
        self.count = self.count.saturating_add(1);
    }

    /// Requests left in this window.
    pub fn remaining(&self, config: &RateLimitConfig) -> u32 {
        config.max_requests.saturating_sub(self.count)
    }
}

/// Outcome of a rate limit check, as reported to callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub remaining: u32,
    /// Seconds until the window resets.
    pub reset: u64,
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
}

impl RateLimitResult {
    pub fn admitted(remaining: u32, reset: u64, limit: u32) -> Self {
        Self {
            success: true,
            message: None,
            remaining,
            reset,
            limit,
            status_code: None,
        }
    }

    pub fn rejected(config: &RateLimitConfig, remaining: u32, reset: u64) -> Self {
        Self {
            success: false,
            message: Some(config.message.clone()),
            remaining,
            reset,
            limit: config.max_requests,
            status_code: Some(config.status_code),
        }
    }

    /// Decide admission for a record that already includes the current request.
    pub fn evaluate(record: &RateLimitRecord, config: &RateLimitConfig, now: u64) -> Self {
        let remaining = record.remaining(config);
        let reset = record.reset_seconds(now);

        if record.count > config.max_requests {
            Self::rejected(config, remaining, reset)
        } else {
            Self::admitted(remaining, reset, config.max_requests)
        }
    }
}
