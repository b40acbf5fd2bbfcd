//! In-memory fixed-window rate limiter.

use std::sync::Arc;

use dashmap::DashMap;

use fibroguard_core::domain::{RateLimitConfig, RateLimitRecord, RateLimitResult};
use fibroguard_core::ports::{Clock, RateLimiter, SystemClock};

/// In-memory rate limiter keyed by client identifier.
///
/// Each identifier gets its own fixed window. The read-modify-write of a check
/// runs under the shard lock held by the map entry, so concurrent requests for
/// the same identifier are counted exactly once each.
///
/// Note: Limits are per-process, not distributed across instances.
pub struct InMemoryRateLimiter {
    records: DashMap<String, RateLimitRecord>,
    clock: Arc<dyn Clock>,
}

impl InMemoryRateLimiter {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            records: DashMap::new(),
            clock,
        }
    }

    /// A limiter driven by the wall clock.
    pub fn system() -> Self {
        Self::new(Arc::new(SystemClock))
    }

    /// Forget everything recorded for `identifier`.
    pub fn reset(&self, identifier: &str) -> bool {
        self.records.remove(identifier).is_some()
    }

    fn record(&self, identifier: &str) -> Option<RateLimitRecord> {
        self.records.get(identifier).map(|entry| *entry)
    }
}

impl Default for InMemoryRateLimiter {
    fn default() -> Self {
        Self::system()
    }
}

impl RateLimiter for InMemoryRateLimiter {
    fn check(&self, identifier: &str, config: &RateLimitConfig) -> RateLimitResult {
        let now = self.clock.now_millis();

        let mut entry = self
            .records
            .entry(identifier.to_string())
            .or_insert_with(|| RateLimitRecord::open(now, config));

        if entry.is_expired(now) {
            *entry = RateLimitRecord::open(now, config);
        }
        if entry.count == 0 {
            tracing::trace!(identifier, reset_at = entry.reset_at, "Opened rate limit window");
        }

        entry.hit();
        let result = RateLimitResult::evaluate(&entry, config, now);
        drop(entry);

        if !result.success {
            tracing::debug!(
                identifier,
                limit = result.limit,
                reset = result.reset,
                "Rate limit exceeded"
            );
        }

        result
    }

    fn peek(&self, identifier: &str, config: &RateLimitConfig) -> RateLimitResult {
        let now = self.clock.now_millis();
        let record = self
            .record(identifier)
            .filter(|record| !record.is_expired(now))
            .unwrap_or_else(|| RateLimitRecord::open(now, config));

        let remaining = record.remaining(config);
        let reset = record.reset_seconds(now);

        if remaining > 0 {
            RateLimitResult::admitted(remaining, reset, config.max_requests)
        } else {
            RateLimitResult::rejected(config, remaining, reset)
        }
    }

    fn purge_expired(&self) -> usize {
        let now = self.clock.now_millis();
        let before = self.records.len();

        self.records.retain(|_, record| record.reset_at >= now);

        let removed = before.saturating_sub(self.records.len());
        if removed > 0 {
            tracing::debug!(removed, remaining = self.records.len(), "Purged expired rate limit records");
        }
        removed
    }

    fn tracked(&self) -> usize {
        self.records.len()
    }
}
