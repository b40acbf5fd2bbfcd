//! Domain entities.

mod rate_limit;

pub use rate_limit::{
    DEFAULT_MAX_REQUESTS, DEFAULT_MESSAGE, DEFAULT_STATUS_CODE, DEFAULT_WINDOW, RateLimitConfig,
    RateLimitRecord, RateLimitResult,
};
