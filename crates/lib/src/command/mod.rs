//! Commands carried over the queue.
//!
//! A queue message is a small JSON object naming an operation and its string
//! arguments:
//!
//! ```json
//! {"command": "addItem", "values": ["key", "value"]}
//! ```
//!
//! [`CommandMessage`] is the raw wire shape. [`Command`] is the validated form
//! the dispatcher works with; converting between the two enforces the argument
//! contract of each operation so the collection never sees a malformed call.

mod errors;

use serde::{Deserialize, Deserializer, Serialize};

pub use errors::CommandError;

/// Wire name of the insert-or-update command.
pub const ADD_ITEM: &str = "addItem";
/// Wire name of the remove command.
pub const DELETE_ITEM: &str = "deleteItem";
/// Wire name of the single lookup command.
pub const GET_ITEM: &str = "getItem";
/// Wire name of the ordered full read command.
pub const GET_ALL_ITEMS: &str = "getAllItems";

/// Raw command message as published on the queue.
///
/// Field names are accepted in both lower-case and capitalised form so that
/// producers emitting `{"Command": ..., "Values": [...]}` interoperate. A
/// missing or `null` value list decodes as empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandMessage {
    #[serde(alias = "Command")]
    pub command: String,
    #[serde(default, alias = "Values", deserialize_with = "null_as_empty")]
    pub values: Vec<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl CommandMessage {
    pub fn new(command: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            command: command.into(),
            values,
        }
    }
}

/// A validated command ready to be applied to the collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Insert `key` at the end, or overwrite its value in place.
    AddItem { key: String, value: String },
    /// Remove `key` if present.
    DeleteItem { key: String },
    /// Emit the value of `key`, or an empty line if absent.
    GetItem { key: String },
    /// Emit every value in insertion order.
    GetAllItems,
}

impl Command {
    /// Wire name of this command.
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddItem { .. } => ADD_ITEM,
            Command::DeleteItem { .. } => DELETE_ITEM,
            Command::GetItem { .. } => GET_ITEM,
            Command::GetAllItems => GET_ALL_ITEMS,
        }
    }

    /// The key this command targets, if any.
    pub fn key(&self) -> Option<&str> {
        match self {
            Command::AddItem { key, .. }
            | Command::DeleteItem { key }
            | Command::GetItem { key } => Some(key),
            Command::GetAllItems => None,
        }
    }

    /// Returns `true` for commands that read the collection and produce output.
    pub fn is_read(&self) -> bool {
        matches!(self, Command::GetItem { .. } | Command::GetAllItems)
    }

    /// Decode and validate a single JSON message body.
    pub fn decode(body: &[u8]) -> Result<Self, CommandError> {
        let message: CommandMessage =
            serde_json::from_slice(body).map_err(|source| CommandError::Decode { source })?;
        Self::try_from(message)
    }

    /// Decode and validate a JSON array of commands, preserving order.
    pub fn decode_batch(body: &[u8]) -> Result<Vec<Self>, CommandError> {
        let messages: Vec<CommandMessage> =
            serde_json::from_slice(body).map_err(|source| CommandError::Decode { source })?;
        messages
            .into_iter()
            .enumerate()
            .map(|(index, message)| {
                Self::try_from(message).map_err(|err| CommandError::InvalidBatchEntry {
                    index,
                    source: Box::new(err),
                })
            })
            .collect()
    }

    /// Convert back to the wire shape for publishing.
    pub fn to_message(&self) -> CommandMessage {
        let values = match self {
            Command::AddItem { key, value } => vec![key.clone(), value.clone()],
            Command::DeleteItem { key } | Command::GetItem { key } => vec![key.clone()],
            Command::GetAllItems => Vec::new(),
        };
        CommandMessage::new(self.name(), values)
    }
}

impl TryFrom<CommandMessage> for Command {
    type Error = CommandError;

    fn try_from(message: CommandMessage) -> Result<Self, Self::Error> {
        let CommandMessage { command, values } = message;
        let wrong_arity = |command, expected, actual| CommandError::WrongArity {
            command,
            expected,
            actual,
        };

        let parsed = match command.as_str() {
            ADD_ITEM => match <[String; 2]>::try_from(values) {
                Ok([key, value]) => Command::AddItem { key, value },
                Err(values) => return Err(wrong_arity(ADD_ITEM, 2, values.len())),
            },
            DELETE_ITEM => match <[String; 1]>::try_from(values) {
                Ok([key]) => Command::DeleteItem { key },
                Err(values) => return Err(wrong_arity(DELETE_ITEM, 1, values.len())),
            },
            GET_ITEM => match <[String; 1]>::try_from(values) {
                Ok([key]) => Command::GetItem { key },
                Err(values) => return Err(wrong_arity(GET_ITEM, 1, values.len())),
            },
            GET_ALL_ITEMS if values.is_empty() => Command::GetAllItems,
            GET_ALL_ITEMS => return Err(wrong_arity(GET_ALL_ITEMS, 0, values.len())),
            _ => return Err(CommandError::UnknownCommand { name: command }),
        };

        if parsed.key().is_some_and(str::is_empty) {
            return Err(CommandError::EmptyKey {
                command: parsed.name(),
            });
        }
        Ok(parsed)
    }
}

impl From<&Command> for CommandMessage {
    fn from(command: &Command) -> Self {
        command.to_message()
    }
}
