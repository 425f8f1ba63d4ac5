use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Error as JsonError;
use thiserror::Error;
use tokio::sync::mpsc::error::SendError as TokioSendError;

use crate::{event::MapEvent, query::parser::ParseError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
pub enum WeftError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("File System error: {0}")]
    Io(String),
    /// An attempt by automatic machinery to delete or demote a `Navigated`
    /// entity. Never triggered by normal input; asserts in debug builds.
    #[error("Note map invariant violated: {0}")]
    InvariantViolation(String),
    #[error("Item Not Found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("You do not have permission to access this resource")]
    PermissionDenied,
    #[error("(De)Serialization error: {0}")]
    Serialization(String),
    /// A structure delta arrived with no resolvable owning graph context.
    /// Callers retry once a session is active; no mutation was performed.
    #[error("No active session to resolve map owner: {0}")]
    UnresolvedOwner(String),
}

impl From<toml::de::Error> for WeftError {
    fn from(src: toml::de::Error) -> WeftError {
        WeftError::Serialization(format!("Toml deserialization error: {src}"))
    }
}

impl From<toml::ser::Error> for WeftError {
    fn from(src: toml::ser::Error) -> WeftError {
        WeftError::Serialization(format!("Toml serialization error: {src}"))
    }
}

impl From<JsonError> for WeftError {
    fn from(src: JsonError) -> WeftError {
        WeftError::Serialization(format!("JSON (de)serialization error: {src}"))
    }
}

impl From<uuid::Error> for WeftError {
    fn from(src: uuid::Error) -> WeftError {
        WeftError::Serialization(format!("UUID conversion failed: {src}"))
    }
}

impl From<io::Error> for WeftError {
    fn from(x: io::Error) -> Self {
        match x.kind() {
            io::ErrorKind::NotFound => WeftError::NotFound(format!("{x}")),
            io::ErrorKind::PermissionDenied => WeftError::PermissionDenied,
            _ => WeftError::Io(format!("IOError: {}", x.kind())),
        }
    }
}

impl From<TokioSendError<MapEvent>> for WeftError {
    fn from(x: TokioSendError<MapEvent>) -> Self {
        WeftError::Io(format!(
            "Channel update send Error, could not transmit map update event {:?}",
            x.0
        ))
    }
}
