//! Bounded request queue between producers and the completion worker.
//!
//! Every producer holds a clone of [`RequestQueue`]; the worker owns the
//! single [`RequestReceiver`]. All clones share one underlying sender, so
//! [`RequestQueue::close`] closes the queue for every producer at once.
//! Requests already buffered stay in the channel and are still drained.

use replybot_core::error::QueueError;
use replybot_core::request::CompletionRequest;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info};

/// The producer side of the queue.
#[derive(Clone)]
pub struct RequestQueue {
    tx: Arc<Mutex<Option<mpsc::Sender<CompletionRequest>>>>,
    capacity: usize,
}

/// The consumer side of the queue, owned by exactly one worker.
pub struct RequestReceiver {
    rx: mpsc::Receiver<CompletionRequest>,
}

impl RequestQueue {
    /// Create a FIFO queue holding at most `capacity` pending requests.
    pub fn bounded(capacity: usize) -> Result<(Self, RequestReceiver), QueueError> {
        if capacity == 0 {
            return Err(QueueError::ZeroCapacity);
        }
        let (tx, rx) = mpsc::channel(capacity);
        let queue = Self {
            tx: Arc::new(Mutex::new(Some(tx))),
            capacity,
        };
        Ok((queue, RequestReceiver { rx }))
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    fn sender(&self) -> Option<mpsc::Sender<CompletionRequest>> {
        self.tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .cloned()
    }

    /// Push a request, waiting while the queue is full.
    ///
    /// Fails with [`QueueError::Closed`] once the queue is closed or the
    /// worker has gone away.
    pub async fn enqueue(&self, request: CompletionRequest) -> Result<(), QueueError> {
        let sender = self.sender().ok_or(QueueError::Closed)?;
        let id = request.id;
        sender.send(request).await.map_err(|_| QueueError::Closed)?;
        debug!(request_id = %id, "Request enqueued");
        Ok(())
    }

    /// Push a request without waiting.
    pub fn try_enqueue(&self, request: CompletionRequest) -> Result<(), QueueError> {
        let sender = self.sender().ok_or(QueueError::Closed)?;
        sender.try_send(request).map_err(|e| match e {
            TrySendError::Full(_) => QueueError::Full,
            TrySendError::Closed(_) => QueueError::Closed,
        })
    }

    /// Stop accepting requests. Returns `false` if already closed.
    pub fn close(&self) -> bool {
        let closed = self
            .tx
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some();
        if closed {
            info!("Request queue closed");
        }
        closed
    }

    pub fn is_closed(&self) -> bool {
        self.sender().is_none_or(|tx| tx.is_closed())
    }
}

impl RequestReceiver {
    /// Next request in FIFO order; `None` once closed and drained.
    pub async fn recv(&mut self) -> Option<CompletionRequest> {
        self.rx.recv().await
    }

    /// Number of requests currently buffered.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use replybot_core::request::PromptSource;
    use std::time::Duration;

    fn request(text: &str) -> CompletionRequest {
        CompletionRequest::new(PromptSource::text(text), "ada").0
    }

    #[test]
    fn zero_capacity_is_rejected() {
        assert!(matches!(
            RequestQueue::bounded(0),
            Err(QueueError::ZeroCapacity)
        ));
    }

    #[tokio::test]
    async fn requests_come_out_in_fifo_order() {
        let (queue, mut rx) = RequestQueue::bounded(4).unwrap();
        for text in ["a", "b", "c"] {
            queue.enqueue(request(text)).await.unwrap();
        }
        assert_eq!(rx.len(), 3);

        for expected in ["a", "b", "c"] {
            let req = rx.recv().await.unwrap();
            assert_eq!(req.source, PromptSource::Text(expected.into()));
        }
        assert!(rx.is_empty());
    }

    #[tokio::test]
    async fn try_enqueue_reports_full() {
        let (queue, _rx) = RequestQueue::bounded(1).unwrap();
        queue.try_enqueue(request("first")).unwrap();
        assert!(matches!(
            queue.try_enqueue(request("second")),
            Err(QueueError::Full)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn enqueue_waits_while_full() {
        let (queue, mut rx) = RequestQueue::bounded(1).unwrap();
        queue.enqueue(request("first")).await.unwrap();

        let producer = queue.clone();
        let blocked = tokio::spawn(async move { producer.enqueue(request("second")).await });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!blocked.is_finished());

        rx.recv().await.unwrap();
        blocked.await.unwrap().unwrap();
        assert_eq!(rx.len(), 1);
    }

    #[tokio::test]
    async fn close_keeps_buffered_requests_and_rejects_new_ones() {
        let (queue, mut rx) = RequestQueue::bounded(4).unwrap();
        queue.enqueue(request("pending")).await.unwrap();

        assert!(queue.close());
        assert!(!queue.close());
        assert!(queue.is_closed());

        let (late, handle) = CompletionRequest::new(PromptSource::text("late"), "ada");
        assert!(matches!(queue.enqueue(late).await, Err(QueueError::Closed)));
        assert!(matches!(handle.recv().await, Err(QueueError::ResponseDropped)));
        assert!(matches!(
            queue.try_enqueue(request("later")),
            Err(QueueError::Closed)
        ));

        let drained = rx.recv().await.unwrap();
        assert_eq!(drained.source, PromptSource::Text("pending".into()));
        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn close_is_shared_by_all_clones() {
        let (queue, _rx) = RequestQueue::bounded(2).unwrap();
        let other = queue.clone();
        queue.close();
        assert!(matches!(other.enqueue(request("x")).await, Err(QueueError::Closed)));
    }

    #[tokio::test]
    async fn dropped_receiver_closes_the_queue() {
        let (queue, rx) = RequestQueue::bounded(2).unwrap();
        drop(rx);
        assert!(queue.is_closed());
        assert!(matches!(queue.enqueue(request("x")).await, Err(QueueError::Closed)));
    }
}
