//!
//! Lightblocks: an insertion-ordered key/value service fed by a command queue.
//!
//! ## Core Concepts
//!
//! * **OrderedMap (`collection::OrderedMap`)**: The thread-safe collection at the center of the
//!   crate. Constant-time insert, update, remove and lookup by key, with values always traversed
//!   in first-insertion order.
//! * **Commands (`command::Command`)**: The four operations (`addItem`, `deleteItem`, `getItem`,
//!   `getAllItems`) decoded and validated from JSON queue messages.
//! * **Queue (`queue`)**: A bounded in-process message channel, optionally fed over HTTP by
//!   separate producer processes.
//! * **Dispatcher (`dispatcher::Dispatcher`)**: Consumes the queue and applies commands to the
//!   map. Inserts are applied in intake order; removals and reads run as detached tasks.
//! * **Sinks (`sink::ResultSink`)**: Where read results go, one value per line.

pub mod collection;
pub mod command;
pub mod dispatcher;
pub mod queue;
pub mod sink;

pub use collection::{InsertOutcome, OrderedMap};
pub use command::Command;
pub use dispatcher::Dispatcher;

/// Result type used throughout the Lightblocks library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the Lightblocks library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Structured errors from the collection diagnostics
    #[error(transparent)]
    Collection(collection::CollectionError),

    /// Structured command decoding and validation errors
    #[error(transparent)]
    Command(command::CommandError),

    /// Structured queue and transport errors
    #[error(transparent)]
    Queue(queue::QueueError),

    /// Structured result sink errors
    #[error(transparent)]
    Sink(sink::SinkError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Collection(_) => "collection",
            Error::Command(_) => "command",
            Error::Queue(_) => "queue",
            Error::Sink(_) => "sink",
        }
    }

    /// Check if this error indicates the collection structure is inconsistent.
    pub fn is_integrity_error(&self) -> bool {
        match self {
            Error::Collection(err) => err.is_integrity_error(),
            _ => false,
        }
    }

    /// Check if this error is a rejected command.
    pub fn is_command_error(&self) -> bool {
        matches!(self, Error::Command(_))
    }

    /// Check if this error is validation-related.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Command(err) => err.is_validation_error(),
            Error::Queue(err) => err.is_configuration_error(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Sink(err) => err.is_io_error(),
            _ => false,
        }
    }

    /// Check if this error is queue or transport related.
    pub fn is_queue_error(&self) -> bool {
        matches!(self, Error::Queue(_))
    }
}
