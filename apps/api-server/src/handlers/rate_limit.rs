//! Quota inspection endpoint.

use actix_web::{HttpRequest, HttpResponse, web};
use fibroguard_shared::ApiResponse;
use fibroguard_shared::dto::RateLimitStatus;

use crate::middleware::rate_limit::client_identifier;
use crate::state::AppState;

/// GET /api/rate-limit
///
/// Reports the caller's quota. The route sits behind the rate limiter, so the
/// figures already include this request.
pub async fn status(req: HttpRequest, state: web::Data<AppState>) -> HttpResponse {
    let client = client_identifier(&req.connection_info());

    let quota = state.rate_limiter.peek(&client, &state.rate_limit);

    HttpResponse::Ok().json(ApiResponse::ok(RateLimitStatus {
        limit: quota.limit,
        remaining: quota.remaining,
        reset: quota.reset,
    }))
}
