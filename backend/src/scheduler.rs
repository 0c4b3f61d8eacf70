//! Periodic weather updates
//!
//! Runs one update immediately on start, then sleeps for the farm's
//! `update_frequency` minutes between cycles. The frequency is re-read after
//! every cycle, so settings changes apply from the next sleep onward.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::services::{FarmSettingsService, WeatherPipeline};

pub struct Scheduler {
    pipeline: Arc<WeatherPipeline>,
    settings: FarmSettingsService,
}

/// Running scheduler. Dropping the handle also stops the loop.
pub struct SchedulerHandle {
    shutdown: watch::Sender<()>,
    task: JoinHandle<()>,
}

impl Scheduler {
    pub fn new(pipeline: Arc<WeatherPipeline>, settings: FarmSettingsService) -> Self {
        Self { pipeline, settings }
    }

    pub fn start(self) -> SchedulerHandle {
        let (shutdown, receiver) = watch::channel(());
        let task = tokio::spawn(self.run(receiver));
        SchedulerHandle { shutdown, task }
    }

    async fn run(self, mut shutdown: watch::Receiver<()>) {
        tracing::info!("Scheduler: running initial weather update");
        tokio::select! {
            _ = self.tick() => {}
            _ = shutdown.changed() => {
                tracing::info!("Scheduler: shutdown signal received, exiting");
                return;
            }
        }

        loop {
            let minutes = self.settings.get_settings().await.update_frequency.max(1);
            tracing::debug!("Scheduler: next weather update in {} minutes", minutes);

            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(u64::from(minutes) * 60)) => {
                    self.tick().await;
                }
                _ = shutdown.changed() => {
                    tracing::info!("Scheduler: shutdown signal received, exiting");
                    break;
                }
            }
        }
    }

    async fn tick(&self) {
        match self.pipeline.run_update_cycle().await {
            Ok(result) => tracing::info!(
                "Scheduler: weather updated ({} recommendations)",
                result.recommendations.len()
            ),
            Err(e) => tracing::error!("Scheduler: weather update failed: {}", e),
        }
    }
}

impl SchedulerHandle {
    /// Signal the loop to stop and wait for it to exit
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        if let Err(e) = self.task.await {
            tracing::error!("Scheduler task ended abnormally: {}", e);
        }
    }
}
