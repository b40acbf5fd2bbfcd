//! Data Transfer Objects - response payloads for the API.

use serde::{Deserialize, Serialize};

/// Server liveness report.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: String,
    /// Clients currently held by the rate limiter.
    pub tracked_clients: usize,
}

/// A client's view of its own rate limit quota.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitStatus {
    pub limit: u32,
    pub remaining: u32,
    /// Seconds until the window resets.
    pub reset: u64,
}
