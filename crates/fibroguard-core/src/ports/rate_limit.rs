//! Rate limiting port.

use crate::domain::{RateLimitConfig, RateLimitResult};

/// Rate limiter trait - abstraction over rate limiting backends.
///
/// Checks are synchronous and infallible: a backend either admits or rejects,
/// and reports the quota left either way.
pub trait RateLimiter: Send + Sync {
    /// Count a request for `identifier` and decide whether it may proceed.
    fn check(&self, identifier: &str, config: &RateLimitConfig) -> RateLimitResult;

    /// Report the quota for `identifier` without counting a request.
    /// `success` tells whether the next request would be admitted.
    fn peek(&self, identifier: &str, config: &RateLimitConfig) -> RateLimitResult;

    /// Drop every record whose window has ended. Returns how many were removed.
    fn purge_expired(&self) -> usize;

    /// Number of stored records, including expired ones not yet purged.
    fn tracked(&self) -> usize;
}
