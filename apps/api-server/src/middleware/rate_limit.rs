//! Rate limiting middleware.

use actix_web::{
    Error, ResponseError,
    body::EitherBody,
    dev::{ConnectionInfo, Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header::{HeaderName, HeaderValue},
};
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::sync::Arc;

use fibroguard_core::domain::{RateLimitConfig, RateLimitResult};
use fibroguard_core::ports::RateLimiter;

use super::error::AppError;

pub const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
pub const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
pub const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");

/// Identifier used when the client address cannot be resolved.
const UNKNOWN_CLIENT: &str = "unknown";

/// `X-RateLimit-*` headers derived from a check result.
pub trait RateLimitHeaders {
    fn rate_limit_headers(&self) -> [(HeaderName, HeaderValue); 3];
}

impl RateLimitHeaders for RateLimitResult {
    fn rate_limit_headers(&self) -> [(HeaderName, HeaderValue); 3] {
        [
            (X_RATELIMIT_LIMIT, HeaderValue::from(self.limit)),
            (X_RATELIMIT_REMAINING, HeaderValue::from(self.remaining)),
            (X_RATELIMIT_RESET, HeaderValue::from(self.reset)),
        ]
    }
}

/// Resolve the rate limiting key for a request: the real client address,
/// honouring `Forwarded` / `X-Forwarded-For` set by the reverse proxy.
pub fn client_identifier(info: &ConnectionInfo) -> String {
    info.realip_remote_addr()
        .unwrap_or(UNKNOWN_CLIENT)
        .to_string()
}

/// Rate limiting middleware factory.
pub struct RateLimitMiddleware {
    limiter: Arc<dyn RateLimiter>,
    config: Arc<RateLimitConfig>,
}

impl RateLimitMiddleware {
    pub fn new(limiter: Arc<dyn RateLimiter>, config: Arc<RateLimitConfig>) -> Self {
        Self { limiter, config }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = RateLimitMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RateLimitMiddlewareService {
            service,
            limiter: self.limiter.clone(),
            config: self.config.clone(),
        }))
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: S,
    limiter: Arc<dyn RateLimiter>,
    config: Arc<RateLimitConfig>,
}

impl<S, B> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let key = client_identifier(&req.connection_info());
        let result = self.limiter.check(&key, &self.config);

        if !result.success {
            tracing::warn!(
                client = %key,
                path = %req.path(),
                reset = result.reset,
                "Rate limit exceeded"
            );

            let response = AppError::RateLimited(result).error_response();
            let (http_req, _payload) = req.into_parts();
            let srv_response = ServiceResponse::new(http_req, response);

            return Box::pin(async move { Ok(srv_response.map_into_right_body()) });
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let mut res = fut.await?;

            let headers = res.headers_mut();
            for (name, value) in result.rate_limit_headers() {
                headers.insert(name, value);
            }

            Ok(res.map_into_left_body())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, http::StatusCode, test, web};
    use fibroguard_core::ports::ManualClock;
    use fibroguard_infra::InMemoryRateLimiter;
    use std::time::Duration;

    fn limiter(clock: Arc<ManualClock>) -> Arc<dyn RateLimiter> {
        Arc::new(InMemoryRateLimiter::new(clock))
    }

    fn policy(max_requests: u32) -> Arc<RateLimitConfig> {
        Arc::new(
            RateLimitConfig::default()
                .with_max_requests(max_requests)
                .with_window(Duration::from_secs(30)),
        )
    }

    fn from_client(ip: &str) -> test::TestRequest {
        test::TestRequest::get()
            .uri("/ping")
            .insert_header(("X-Forwarded-For", ip))
    }

    #[actix_rt::test]
    async fn test_rejects_after_limit() {
        let clock = Arc::new(ManualClock::new(0));
        let app = test::init_service(
            App::new()
                .wrap(RateLimitMiddleware::new(limiter(clock.clone()), policy(2)))
                .route("/ping", web::get().to(|| async { HttpResponse::Ok().body("pong") })),
        )
        .await;

        for remaining in ["1", "0"] {
            let res = test::call_service(&app, from_client("10.0.0.1").to_request()).await;
            assert_eq!(res.status(), StatusCode::OK);
            assert_eq!(res.headers().get("X-RateLimit-Remaining").unwrap(), remaining);
            assert_eq!(res.headers().get("X-RateLimit-Limit").unwrap(), "2");
        }

        clock.set(10_500);
        let res = test::call_service(&app, from_client("10.0.0.1").to_request()).await;
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(res.headers().get("Retry-After").unwrap(), "20");
        assert_eq!(res.headers().get("X-RateLimit-Remaining").unwrap(), "0");

        let body: serde_json::Value = test::read_body_json(res).await;
        assert_eq!(body["message"], RateLimitConfig::default().message);
        assert_eq!(body["retry_after"], 20);
    }

    #[actix_rt::test]
    async fn test_clients_are_limited_separately() {
        let clock = Arc::new(ManualClock::new(0));
        let app = test::init_service(
            App::new()
                .wrap(RateLimitMiddleware::new(limiter(clock), policy(1)))
                .route("/ping", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        let res = test::call_service(&app, from_client("10.0.0.1").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
        let res = test::call_service(&app, from_client("10.0.0.1").to_request()).await;
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

        let res = test::call_service(&app, from_client("10.0.0.2").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_rt::test]
    async fn test_window_reset_readmits_client() {
        let clock = Arc::new(ManualClock::new(0));
        let app = test::init_service(
            App::new()
                .wrap(RateLimitMiddleware::new(limiter(clock.clone()), policy(1)))
                .route("/ping", web::get().to(|| async { HttpResponse::Ok().finish() })),
        )
        .await;

        test::call_service(&app, from_client("10.0.0.1").to_request()).await;
        let res = test::call_service(&app, from_client("10.0.0.1").to_request()).await;
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);

        clock.set(30_000);
        let res = test::call_service(&app, from_client("10.0.0.1").to_request()).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[actix_rt::test]
    async fn test_client_identifier_falls_back_to_unknown() {
        let req = test::TestRequest::get().to_srv_request();
        assert_eq!(client_identifier(&req.connection_info()), UNKNOWN_CLIENT);

        let req = test::TestRequest::get()
            .peer_addr("192.168.1.7:50000".parse().unwrap())
            .to_srv_request();
        assert_eq!(client_identifier(&req.connection_info()), "192.168.1.7");
    }
}
