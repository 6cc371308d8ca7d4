//! Background task that releases expired encounters, fights and requests

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::game::GameService;

/// Sweep every `period` until `shutdown` flips to true or its sender drops
pub fn spawn_sweeper(
    service: Arc<GameService>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<u64> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut passes = 0u64;

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let service = Arc::clone(&service);
                    match tokio::task::spawn_blocking(move || service.sweep()).await {
                        Ok(_) => passes += 1,
                        Err(e) => tracing::error!("Sweep task failed: {}", e),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!(passes, "Sweeper stopped");
        passes
    })
}
