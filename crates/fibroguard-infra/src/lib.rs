//! # FibroGuardian Infrastructure
//!
//! Concrete implementations of the ports defined in `fibroguard-core`.

pub mod rate_limit;

pub use rate_limit::InMemoryRateLimiter;
