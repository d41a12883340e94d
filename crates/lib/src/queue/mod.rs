//! Command queue.
//!
//! The queue is a bounded in-process channel of raw message bodies. A
//! [`Publisher`] pushes bodies in, the single [`Consumer`] hands them to the
//! dispatcher in arrival order. The [`http`] module exposes a publisher over
//! HTTP so separate producer processes can feed the queue.

pub mod http;

mod endpoint;
mod errors;

use tokio::sync::mpsc;

pub use endpoint::QueueEndpoint;
pub use errors::QueueError;

use crate::{Result, command::CommandMessage};

/// Name of the queue used when a URL does not name one.
pub const DEFAULT_QUEUE: &str = "commands";

/// Default number of messages buffered before publishers wait.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Create a queue holding at most `capacity` undelivered messages.
pub fn channel(capacity: usize) -> (Publisher, Consumer) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (Publisher { tx }, Consumer { rx })
}

/// Sending half of the queue. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Publisher {
    tx: mpsc::Sender<Vec<u8>>,
}

impl Publisher {
    /// Enqueue a raw message body, waiting if the queue is full.
    pub async fn publish(&self, body: Vec<u8>) -> Result<()> {
        self.tx
            .send(body)
            .await
            .map_err(|_| QueueError::Closed.into())
    }

    /// Serialize and enqueue a command message.
    pub async fn publish_message(&self, message: &CommandMessage) -> Result<()> {
        let body = serde_json::to_vec(message).map_err(|source| QueueError::Encode { source })?;
        self.publish(body).await
    }

    /// Returns `true` once the consumer has been dropped or closed.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Receiving half of the queue.
#[derive(Debug)]
pub struct Consumer {
    rx: mpsc::Receiver<Vec<u8>>,
}

impl Consumer {
    /// Next message body, or `None` once every publisher is gone and the
    /// buffer is drained.
    pub async fn next(&mut self) -> Option<Vec<u8>> {
        self.rx.recv().await
    }

    /// Stop accepting new messages. Already buffered messages can still be read.
    pub fn close(&mut self) {
        self.rx.close();
    }
}
