//! Background work that runs beside the HTTP server.

mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use fibroguard_core::ports::RateLimiter;
use tokio_cron_scheduler::JobSchedulerError;

pub use scheduler::{Scheduler, SchedulerConfig};

/// Register the periodic removal of expired rate limit records.
pub async fn schedule_rate_limit_sweep(
    scheduler: &Scheduler,
    limiter: Arc<dyn RateLimiter>,
    interval: Duration,
) -> Result<uuid::Uuid, JobSchedulerError> {
    scheduler
        .add_repeated("rate_limit_sweep", interval, move || {
            let limiter = limiter.clone();
            async move {
                let removed = limiter.purge_expired();
                tracing::debug!(removed, tracked = limiter.tracked(), "Rate limit sweep finished");
            }
        })
        .await
}
