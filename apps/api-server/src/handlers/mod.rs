//! HTTP handlers and route configuration.

mod health;
mod rate_limit;

use actix_web::middleware::Condition;
use actix_web::{HttpRequest, web};

use crate::middleware::{AppError, AppResult, RateLimitMiddleware};
use crate::state::AppState;

/// Configure all application routes.
///
/// `/api/health` stays reachable for probes; everything else under `/api`
/// is rate limited per client unless `rate_limited` is false.
pub fn configure_routes(
    state: &AppState,
    rate_limited: bool,
) -> impl FnOnce(&mut web::ServiceConfig) {
    let limiter = RateLimitMiddleware::new(state.rate_limiter.clone(), state.rate_limit.clone());

    move |cfg: &mut web::ServiceConfig| {
        cfg.service(
            web::scope("/api")
                // Public routes
                .route("/health", web::get().to(health::health_check))
                // Rate limited routes
                .service(
                    web::scope("")
                        .wrap(Condition::new(rate_limited, limiter))
                        .route("/rate-limit", web::get().to(rate_limit::status)),
                ),
        )
        .default_service(web::to(not_found));
    }
}

async fn not_found(req: HttpRequest) -> AppResult<actix_web::HttpResponse> {
    Err(AppError::NotFound(format!("No route for {}", req.path())))
}
