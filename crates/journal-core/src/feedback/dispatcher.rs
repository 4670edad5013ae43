//! Detached feedback dispatch.
//!
//! Requests hand jobs to a bounded queue and return immediately. A worker task drains the
//! queue and runs each job as its own task. Nothing is awaited by, or reported back to, the
//! request that enqueued it; failures are logged and dropped.

use crate::feedback::generator::{FeedbackGenerator, FeedbackJob};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

#[derive(Clone)]
pub struct FeedbackDispatcher {
    tx: mpsc::Sender<FeedbackJob>,
}

impl FeedbackDispatcher {
    /// Spawn the worker on the current runtime. The worker exits once every dispatcher clone is dropped.
    pub fn start(generator: Arc<FeedbackGenerator>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let worker = tokio::spawn(run_worker(rx, generator));
        (Self { tx }, worker)
    }

    /// Enqueue without waiting. Returns `false` when the job was dropped (queue full or closed).
    pub fn dispatch(&self, job: FeedbackJob) -> bool {
        match self.tx.try_send(job) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(job)) => {
                tracing::warn!(user = %job.user_key, "feedback queue full, dropping job");
                false
            }
            Err(mpsc::error::TrySendError::Closed(job)) => {
                tracing::warn!(user = %job.user_key, "feedback worker stopped, dropping job");
                false
            }
        }
    }
}

async fn run_worker(mut rx: mpsc::Receiver<FeedbackJob>, generator: Arc<FeedbackGenerator>) {
    while let Some(job) = rx.recv().await {
        let generator = Arc::clone(&generator);
        tokio::spawn(async move {
            match generator.generate(&job).await {
                Ok(Some(record)) => {
                    tracing::debug!(user = %job.user_key, id = %record.id, "feedback job done")
                }
                Ok(None) => {}
                Err(e) => tracing::error!(
                    user = %job.user_key,
                    interaction = %job.interaction.id,
                    "error generating AI feedback: {}",
                    e
                ),
            }
        });
    }
    tracing::debug!("feedback worker stopped");
}
