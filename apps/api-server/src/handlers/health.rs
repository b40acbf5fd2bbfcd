//! Health check endpoint.

use actix_web::{HttpResponse, web};
use fibroguard_shared::dto::HealthResponse;

use crate::state::AppState;

/// Health check endpoint - returns server status.
///
/// GET /api/health
pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        tracked_clients: state.rate_limiter.tracked(),
    };

    HttpResponse::Ok().json(response)
}
