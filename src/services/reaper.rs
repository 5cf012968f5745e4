//! Background sweep for stuck ingestion rows.
//!
//! A trigger commits its InProgress row before the outbound call and the
//! terminal state after it. A crash between the two commits leaves the row
//! InProgress forever; this task periodically fails rows older than the
//! configured threshold.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time::interval;
use tracing::{error, info};

use crate::db::{self, DbPool};
use crate::error::AppResult;

/// Configuration for the stuck-ingestion sweep.
#[derive(Clone)]
pub struct ReaperConfig {
    /// Age after which an InProgress row is considered stuck
    pub stuck_after_secs: u64,
    /// How often to run the sweep (in seconds)
    pub interval_secs: u64,
}

/// Start the sweep background task.
pub fn start_reaper_task(pool: Arc<DbPool>, config: ReaperConfig) {
    tokio::spawn(async move {
        info!(
            "Starting ingestion reaper (stuck after: {} seconds, interval: {} seconds)",
            config.stuck_after_secs, config.interval_secs
        );

        let mut ticker = interval(Duration::from_secs(config.interval_secs));

        loop {
            ticker.tick().await;

            if let Err(e) = run_sweep(&pool, &config).await {
                error!("Ingestion reaper error: {}", e);
            }
        }
    });
}

/// Run a single sweep cycle.
async fn run_sweep(pool: &DbPool, config: &ReaperConfig) -> AppResult<()> {
    let cutoff = Utc::now() - chrono::Duration::seconds(config.stuck_after_secs as i64);

    let swept = db::ingestion_statuses::mark_stuck_failed(pool.connection(), cutoff).await?;

    if swept > 0 {
        info!("Swept {} stuck ingestion rows to Failed", swept);
    }

    Ok(())
}
