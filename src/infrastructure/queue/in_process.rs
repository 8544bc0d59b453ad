use super::{GenerationQueue, QueueError, RetryPolicy};
use crate::domain::generation::{GenerationWorker, PipelineError};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// Tokio-backed job queue.
///
/// A dispatcher task pulls ids off an unbounded channel and runs each unit of
/// work in its own task, at most `concurrency` at a time. Retries of one unit
/// run sequentially inside that task. Dropping every handle to the queue
/// closes the channel; the dispatcher then waits for in-flight work and exits.
pub struct InProcessQueue {
    sender: mpsc::UnboundedSender<Uuid>,
}

impl InProcessQueue {
    pub fn start(
        worker: Arc<GenerationWorker>,
        policy: RetryPolicy,
        concurrency: usize,
    ) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::unbounded_channel::<Uuid>();
        let concurrency = concurrency.max(1);
        let semaphore = Arc::new(Semaphore::new(concurrency));

        let dispatcher = tokio::spawn(async move {
            tracing::info!(concurrency = concurrency, "Generation queue started");

            while let Some(generation_id) = receiver.recv().await {
                let permit = match semaphore.clone().acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => break,
                };
                let worker = worker.clone();
                let policy = policy.clone();

                tokio::spawn(async move {
                    let _permit = permit;
                    process_job(&worker, &policy, generation_id).await;
                });
            }

            // Wait for in-flight jobs by taking every permit back
            let _drained = semaphore.acquire_many(concurrency as u32).await;
            tracing::info!("Generation queue drained");
        });

        (Self { sender }, dispatcher)
    }
}

#[async_trait]
impl GenerationQueue for InProcessQueue {
    async fn enqueue(&self, generation_id: Uuid) -> Result<(), QueueError> {
        self.sender
            .send(generation_id)
            .map_err(|_| QueueError::Closed)?;
        tracing::debug!(generation_id = %generation_id, "Generation enqueued");
        Ok(())
    }
}

async fn process_job(worker: &GenerationWorker, policy: &RetryPolicy, generation_id: Uuid) {
    let result = policy
        .execute(generation_id, |attempt| {
            tracing::debug!(generation_id = %generation_id, attempt = attempt, "Running generation attempt");
            worker.run(generation_id)
        })
        .await;

    match result {
        Ok(()) => {}
        Err(PipelineError::NotFound(_)) => {
            tracing::warn!(generation_id = %generation_id, "Generation vanished, dropping job");
        }
        Err(err) => {
            tracing::error!(
                generation_id = %generation_id,
                max_attempts = policy.max_attempts,
                error = %err,
                "Generation abandoned after exhausting attempts"
            );
        }
    }
}
