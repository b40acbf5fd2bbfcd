//! Error handling - RFC 7807 compliant responses.

use actix_web::http::{StatusCode, header};
use actix_web::{HttpResponse, HttpResponseBuilder, ResponseError};
use fibroguard_core::DomainError;
use fibroguard_core::domain::RateLimitResult;
use fibroguard_shared::ErrorResponse;

use super::rate_limit::RateLimitHeaders;

/// Application-level error type that converts to RFC 7807 responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Rate limit exceeded")]
    RateLimited(RateLimitResult),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid configuration: {0}")]
    Config(#[from] DomainError),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::RateLimited(result) => result
                .status_code
                .and_then(|code| StatusCode::from_u16(code).ok())
                .unwrap_or(StatusCode::TOO_MANY_REQUESTS),
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        match self {
            AppError::RateLimited(result) => {
                let message = result.message.clone().unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Too Many Requests")
                        .to_string()
                });
                let error = ErrorResponse::too_many_requests(status.as_u16(), message, result.reset);

                let mut builder = HttpResponseBuilder::new(status);
                builder.insert_header((header::RETRY_AFTER, result.reset.to_string()));
                for pair in result.rate_limit_headers() {
                    builder.insert_header(pair);
                }
                builder.json(error)
            }
            AppError::NotFound(detail) => {
                HttpResponse::build(status).json(ErrorResponse::not_found(detail))
            }
            AppError::Config(err) => {
                tracing::error!("Configuration error: {}", err);
                HttpResponse::build(status).json(ErrorResponse::internal_error())
            }
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;
