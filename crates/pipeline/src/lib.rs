//! The completion request pipeline.
//!
//! Producers push [`CompletionRequest`]s onto a bounded [`RequestQueue`].
//! A single [`CompletionWorker`] drains it, one request at a time:
//!
//! 1. **Validate** the model name and sampling parameters
//! 2. **Build the prompt** (render a thread with the [`Persona`], or use literal text)
//! 3. **Generate** a continuation via the completion engine
//! 4. **Classify** it with the [`SafetyClassifier`]; regenerate while unsafe,
//!    up to the retry limit, then fall back to a fixed reply
//! 5. **Filter** the accepted text with the request's stop pattern
//! 6. **Deliver** exactly one response on the request's own slot
//!
//! Because there is exactly one worker per queue, at most one engine call
//! is in flight and responses come back in FIFO order.
//!
//! [`CompletionRequest`]: replybot_core::CompletionRequest

pub mod filter;
pub mod prompt;
pub mod queue;
pub mod safety;
pub mod worker;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use filter::ResponseFilter;
pub use prompt::Persona;
pub use queue::{RequestQueue, RequestReceiver};
pub use safety::SafetyClassifier;
pub use worker::{CompletionWorker, WorkerSettings, WorkerSummary};

use replybot_core::error::QueueError;
use tokio::task::JoinHandle;

/// Create a queue of `capacity` and start `worker` draining it.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_pipeline(
    worker: CompletionWorker,
    capacity: usize,
) -> Result<(RequestQueue, JoinHandle<WorkerSummary>), QueueError> {
    let (queue, receiver) = RequestQueue::bounded(capacity)?;
    let handle = worker.spawn(receiver);
    Ok((queue, handle))
}
