//! Error types for the command queue and its HTTP transport.

use thiserror::Error;

/// Errors that can occur while configuring, serving, or publishing to a queue.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QueueError {
    /// The queue URL could not be parsed.
    #[error("Invalid queue URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The queue URL uses a scheme the transport does not speak.
    #[error("Unsupported queue URL scheme '{scheme}', expected http")]
    UnsupportedScheme { scheme: String },

    /// The queue URL has no host component.
    #[error("Queue URL '{url}' has no host")]
    MissingHost { url: String },

    /// The queue server could not bind its listener.
    #[error("Failed to bind queue server to {address}: {reason}")]
    Bind { address: String, reason: String },

    /// The consuming side of the queue has gone away.
    #[error("Queue is closed")]
    Closed,

    /// A message could not be serialized for publishing.
    #[error("Failed to encode message for publishing")]
    Encode {
        #[source]
        source: serde_json::Error,
    },

    /// The request carrying a message did not reach the queue server.
    #[error("Failed to publish to {url}: {reason}")]
    Publish { url: String, reason: String },

    /// The queue server refused a published message.
    #[error("Queue at {url} rejected message with HTTP status {status}")]
    Rejected { url: String, status: u16 },
}

impl QueueError {
    /// Check if this error comes from an unusable queue URL.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            QueueError::InvalidUrl { .. }
                | QueueError::UnsupportedScheme { .. }
                | QueueError::MissingHost { .. }
        )
    }

    /// Check if this error is network related.
    pub fn is_network_error(&self) -> bool {
        matches!(
            self,
            QueueError::Bind { .. } | QueueError::Publish { .. } | QueueError::Rejected { .. }
        )
    }

    /// Check if the queue has been closed.
    pub fn is_closed(&self) -> bool {
        matches!(self, QueueError::Closed)
    }
}

impl From<QueueError> for crate::Error {
    fn from(err: QueueError) -> Self {
        crate::Error::Queue(err)
    }
}
