//! Error types for command decoding and validation.

use thiserror::Error;

/// Errors raised while turning a queue message into a [`Command`].
///
/// Every variant is produced before the collection is touched; a command
/// that fails here is never applied.
///
/// [`Command`]: super::Command
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CommandError {
    /// The message body is not a valid JSON command.
    #[error("Failed to decode command")]
    Decode {
        /// The underlying deserialization error
        #[source]
        source: serde_json::Error,
    },

    /// The command name is not one of the supported operations.
    #[error("Unknown command: {name}")]
    UnknownCommand {
        /// The name received
        name: String,
    },

    /// The command carried the wrong number of values.
    #[error("Command {command} expects {expected} value(s), got {actual}")]
    WrongArity {
        /// Wire name of the command
        command: &'static str,
        /// Number of values the command requires
        expected: usize,
        /// Number of values received
        actual: usize,
    },

    /// The key argument was an empty string.
    #[error("Command {command} requires a non-empty key")]
    EmptyKey {
        /// Wire name of the command
        command: &'static str,
    },

    /// One entry of a command batch was invalid.
    #[error("Invalid command at position {index}")]
    InvalidBatchEntry {
        /// Zero-based position in the batch
        index: usize,
        /// Why the entry was rejected
        #[source]
        source: Box<CommandError>,
    },
}

impl CommandError {
    /// Check if the message could not be parsed at all.
    pub fn is_decode_error(&self) -> bool {
        match self {
            CommandError::Decode { .. } => true,
            CommandError::InvalidBatchEntry { source, .. } => source.is_decode_error(),
            _ => false,
        }
    }

    /// Check if the message parsed but broke the argument contract.
    pub fn is_validation_error(&self) -> bool {
        match self {
            CommandError::UnknownCommand { .. }
            | CommandError::WrongArity { .. }
            | CommandError::EmptyKey { .. } => true,
            CommandError::InvalidBatchEntry { source, .. } => source.is_validation_error(),
            CommandError::Decode { .. } => false,
        }
    }
}

impl From<CommandError> for crate::Error {
    fn from(err: CommandError) -> Self {
        crate::Error::Command(err)
    }
}
