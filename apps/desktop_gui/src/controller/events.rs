//! Backend-to-UI events.

use client_core::StyledText;

/// Why the backend worker could not start.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StartupFailure {
    #[error("failed to build backend runtime: {0}")]
    Runtime(String),
    #[error("invalid server url '{url}': {reason}")]
    InvalidServerUrl { url: String, reason: String },
}

impl StartupFailure {
    /// Short, user-facing text for the status line.
    pub fn user_message(&self) -> String {
        match self {
            Self::Runtime(_) => {
                "Backend worker startup failure; verify local app environment and relaunch."
                    .to_string()
            }
            Self::InvalidServerUrl { url, .. } => {
                format!("Server URL '{url}' is not valid; fix it and relaunch.")
            }
        }
    }
}

pub enum UiEvent {
    Info(String),
    /// The backend worker could not start; no turns can be sent.
    StartupFailed(StartupFailure),
    UserTurn(String),
    AiTurn(StyledText),
    ErrorTurn(StyledText),
    Pending(bool),
}

#[cfg(test)]
mod tests {
    use super::StartupFailure;

    #[test]
    fn invalid_url_message_names_the_url() {
        let failure = StartupFailure::InvalidServerUrl {
            url: "localhost".into(),
            reason: "relative URL without a base".into(),
        };
        assert!(failure.user_message().starts_with("Server URL 'localhost' is not valid"));
        assert_eq!(
            failure.to_string(),
            "invalid server url 'localhost': relative URL without a base"
        );
    }

    #[test]
    fn runtime_failure_hides_internal_reason() {
        let failure = StartupFailure::Runtime("boom".into());
        assert!(!failure.user_message().contains("boom"));
        assert_eq!(failure.to_string(), "failed to build backend runtime: boom");
    }
}
