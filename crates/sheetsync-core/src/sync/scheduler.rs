//! Sequential sync passes on a fixed, self-rearming delay.

use std::future::Future;
use std::time::Duration;

use chrono::Utc;

use crate::error::Result;
use crate::integrations::traits::DocumentClient;
use crate::storage::StateStore;
use crate::sync::processor::SyncProcessor;
use crate::sync::types::{PassSummary, SyncTarget};

/// Delay between passes unless configured otherwise.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(30 * 60);

pub struct SyncScheduler<D, S> {
    processor: SyncProcessor<D, S>,
    targets: Vec<SyncTarget>,
    interval: Duration,
}

impl<D: DocumentClient, S: StateStore> SyncScheduler<D, S> {
    pub fn new(processor: SyncProcessor<D, S>, targets: Vec<SyncTarget>) -> Self {
        Self {
            processor,
            targets,
            interval: DEFAULT_INTERVAL,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Process every target in order. The first error aborts the pass.
    pub async fn run_pass(&self) -> Result<PassSummary> {
        let mut summary = PassSummary {
            started_at: Some(Utc::now()),
            ..Default::default()
        };

        for target in &self.targets {
            let updated = self.processor.process_item(target).await?;
            tracing::info!(
                table = %target.destination_key,
                sheet = %target.source_document_id,
                updated,
                "target processed"
            );
            if updated {
                summary.updated.push(target.destination_key.clone());
            } else {
                summary.unchanged.push(target.destination_key.clone());
            }
        }

        summary.finished_at = Some(Utc::now());
        Ok(summary)
    }

    /// Run passes until `shutdown` resolves; returns the number of passes run.
    ///
    /// Every pass, failed or not, is followed by the full interval. `shutdown`
    /// is only observed while waiting between passes.
    pub async fn run_until<F>(&self, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut passes = 0;

        loop {
            match self.run_pass().await {
                Ok(summary) => tracing::info!(
                    at = %Utc::now().to_rfc3339(),
                    updated = summary.updated.len(),
                    unchanged = summary.unchanged.len(),
                    "sync end"
                ),
                Err(e) => tracing::error!(
                    at = %Utc::now().to_rfc3339(),
                    error = %e,
                    "sync pass failed"
                ),
            }
            passes += 1;

            tracing::debug!(delay_secs = self.interval.as_secs(), "next pass scheduled");
            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = &mut shutdown => {
                    tracing::info!(passes, "scheduler stopped");
                    return passes;
                }
            }
        }
    }

    /// Run passes until the process is killed.
    pub async fn run_forever(&self) {
        self.run_until(std::future::pending::<()>()).await;
    }
}
