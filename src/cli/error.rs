use std::fmt;

use crate::gateway::RequestError;
use crate::models::ConversationId;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CliError: errors surfaced by the `chatdesk` commands
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug)]
pub enum CliError {
    // Config errors
    ConfigLoadFailed { source: config::ConfigError },

    // Backend errors
    RequestFailed {
        action: &'static str,
        source: RequestError,
    },
    ConversationNotFound { id: ConversationId },

    // Input errors
    InvalidInput(String),
    Prompt(dialoguer::Error),

    // Runtime errors
    Runtime(String),
    Serialize(serde_json::Error),
    Io(std::io::Error),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigLoadFailed { source } => {
                write!(f, "Failed to load configuration: {source}")
            }
            Self::RequestFailed { action, source } => {
                write!(f, "Failed to {action}: {source}")
            }
            Self::ConversationNotFound { id } => {
                write!(f, "Conversation {id} not found. Run: chatdesk list")
            }
            Self::InvalidInput(msg) => write!(f, "{msg}"),
            Self::Prompt(err) => write!(f, "Prompt failed: {err}"),
            Self::Runtime(msg) => write!(f, "Runtime error: {msg}"),
            Self::Serialize(err) => write!(f, "Failed to encode output: {err}"),
            Self::Io(err) => write!(f, "I/O error: {err}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ConfigLoadFailed { source } => Some(source),
            Self::RequestFailed { source, .. } => Some(source),
            Self::Prompt(err) => Some(err),
            Self::Serialize(err) => Some(err),
            Self::Io(err) => Some(err),
            Self::ConversationNotFound { .. } | Self::InvalidInput(_) | Self::Runtime(_) => None,
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err)
    }
}

impl From<config::ConfigError> for CliError {
    fn from(err: config::ConfigError) -> Self {
        Self::ConfigLoadFailed { source: err }
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(err: dialoguer::Error) -> Self {
        Self::Prompt(err)
    }
}
