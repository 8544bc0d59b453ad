pub mod in_process;
pub mod retry;

use async_trait::async_trait;
use uuid::Uuid;

pub use in_process::InProcessQueue;
pub use retry::RetryPolicy;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QueueError {
    #[error("job queue is closed")]
    Closed,
}

/// Hands generation ids to the background worker.
///
/// Delivery is at-least-once: a unit of work may run more than once for the
/// same record, never concurrently with itself under normal operation.
#[async_trait]
pub trait GenerationQueue: Send + Sync {
    async fn enqueue(&self, generation_id: Uuid) -> Result<(), QueueError>;
}
