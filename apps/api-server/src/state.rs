//! Application state - shared across all handlers.

use std::sync::Arc;

use fibroguard_core::domain::RateLimitConfig;
use fibroguard_core::ports::RateLimiter;
use fibroguard_infra::InMemoryRateLimiter;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub rate_limiter: Arc<dyn RateLimiter>,
    /// Policy applied to rate limited routes.
    pub rate_limit: Arc<RateLimitConfig>,
}

impl AppState {
    /// Build the application state with the process-local limiter.
    pub fn new(policy: RateLimitConfig) -> Self {
        let state = Self::with_limiter(Arc::new(InMemoryRateLimiter::system()), policy);

        tracing::info!(
            window_ms = state.rate_limit.window_millis(),
            max_requests = state.rate_limit.max_requests,
            "Application state initialized"
        );
        state
    }

    /// Build the state around an existing limiter.
    pub fn with_limiter(rate_limiter: Arc<dyn RateLimiter>, policy: RateLimitConfig) -> Self {
        Self {
            rate_limiter,
            rate_limit: Arc::new(policy),
        }
    }
}
