use thiserror::Error;

use crate::protocol::AskErrorBody;

/// Why a chat turn did not produce an answer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TurnError {
    /// Non-2xx response carrying a server supplied message.
    #[error("{message}")]
    Rejected { status: u16, message: String },
    /// Non-2xx response without a usable message.
    #[error("HTTP error! status: {status}")]
    Status { status: u16 },
    #[error("network error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl TurnError {
    /// Builds the error for a non-2xx reply. Blank server messages fall back to the status.
    pub fn from_status(status: u16, body: Option<AskErrorBody>) -> Self {
        match body.and_then(|body| body.error) {
            Some(message) if !message.trim().is_empty() => Self::Rejected { status, message },
            _ => Self::Status { status },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } | Self::Status { status } => Some(*status),
            Self::Transport(_) | Self::MalformedResponse(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown theme '{0}'")]
pub struct ParseThemeError(pub String);
