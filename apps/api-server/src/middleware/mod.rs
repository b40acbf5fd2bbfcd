//! Middleware modules.

pub mod error;
pub mod rate_limit;

pub use error::{AppError, AppResult};
pub use rate_limit::RateLimitMiddleware;
