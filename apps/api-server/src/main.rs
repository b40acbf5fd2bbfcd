//! # FibroGuardian API Server
//!
//! The main entry point for the Actix-web HTTP server.

use actix_web::{App, HttpServer, web};
use tracing_actix_web::TracingLogger;

mod background;
mod config;
mod handlers;
mod middleware;
mod state;
mod telemetry;

use background::Scheduler;
use config::AppConfig;
use middleware::AppError;
use state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();
    telemetry::init_telemetry(&config.telemetry);

    config
        .validate()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, AppError::from(e)))?;

    tracing::info!(
        "Starting FibroGuardian API Server on {}:{}",
        config.host,
        config.port
    );

    let state = AppState::new(config.rate_limit.policy.clone());
    let mut scheduler = start_background_jobs(&config, &state)
        .await
        .map_err(|e| std::io::Error::other(format!("failed to start scheduler: {e:?}")))?;

    let rate_limited = config.rate_limit.enabled;
    if !rate_limited {
        tracing::warn!("Rate limiting disabled");
    }

    let server_state = state.clone();
    let result = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(web::Data::new(server_state.clone()))
            .configure(handlers::configure_routes(&server_state, rate_limited))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await;

    if let Err(e) = scheduler.shutdown().await {
        tracing::error!("Failed to stop scheduler: {:?}", e);
    }

    result
}

/// Register and start the periodic jobs.
async fn start_background_jobs(
    config: &AppConfig,
    state: &AppState,
) -> Result<Scheduler, tokio_cron_scheduler::JobSchedulerError> {
    let scheduler = Scheduler::new(config.scheduler.clone()).await?;

    if scheduler.is_enabled() {
        background::schedule_rate_limit_sweep(
            &scheduler,
            state.rate_limiter.clone(),
            config.rate_limit.sweep_interval,
        )
        .await?;
    } else {
        tracing::warn!("Scheduler disabled; expired rate limit records are only replaced lazily");
    }

    scheduler.start().await?;
    Ok(scheduler)
}
