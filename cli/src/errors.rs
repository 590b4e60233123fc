//! Error types for the backend-im CLI

use std::time::Duration;

use thiserror::Error;

/// Why a deployment watch stopped without a usable terminal stage
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WatchError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timed out after {}s waiting for {context}", elapsed.as_secs())]
    Timeout {
        elapsed: Duration,
        context: String,
    },

    #[error("Malformed status payload: {0}")]
    Decode(String),

    #[error("WebSocket closed with code {code}: {reason}")]
    Closed { code: u16, reason: String },

    #[error("Deployment failed: {0}")]
    RemoteFailure(String),

    #[error("No terminal deployment state reached")]
    NoTerminalState,

    #[error("Cancelled")]
    Cancelled,
}

impl WatchError {
    /// Network and protocol failures, including malformed payloads
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            WatchError::Transport(_) | WatchError::Decode(_) | WatchError::Closed { .. }
        )
    }
}

impl From<serde_json::Error> for WatchError {
    fn from(err: serde_json::Error) -> Self {
        WatchError::Decode(err.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for WatchError {
    fn from(err: tokio_tungstenite::tungstenite::Error) -> Self {
        WatchError::Transport(err.to_string())
    }
}

/// Main error type for the CLI
#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("API error ({status}): {body}")]
    ApiError { status: u16, body: String },

    #[error("Authentication error: {0}")]
    AuthError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Project error: {0}")]
    ProjectError(String),

    #[error("{0}")]
    Watch(#[from] WatchError),

    #[error("Deployment outcome unknown: {0}")]
    Incomplete(WatchError),

    #[error("Interrupted")]
    Interrupted,
}

impl CliError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            CliError::Incomplete(_) => 2,
            CliError::Interrupted => 130,
            _ => 1,
        }
    }

    /// Whether this should be reported as a warning rather than an error
    pub fn is_warning(&self) -> bool {
        matches!(self, CliError::Incomplete(_) | CliError::Interrupted)
    }
}

impl From<CliError> for WatchError {
    fn from(err: CliError) -> Self {
        match err {
            CliError::JsonError(e) => WatchError::Decode(e.to_string()),
            CliError::HttpError(e) if e.is_decode() => WatchError::Decode(e.to_string()),
            CliError::Watch(e) | CliError::Incomplete(e) => e,
            CliError::Interrupted => WatchError::Cancelled,
            other => WatchError::Transport(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_class() {
        assert!(WatchError::Decode("bad".to_string()).is_transport());
        assert!(WatchError::Closed {
            code: 1011,
            reason: String::new()
        }
        .is_transport());
        assert!(!WatchError::NoTerminalState.is_transport());
        assert!(!WatchError::Timeout {
            elapsed: Duration::from_secs(30),
            context: "status".to_string()
        }
        .is_transport());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::Incomplete(WatchError::NoTerminalState).exit_code(), 2);
        assert!(CliError::Incomplete(WatchError::NoTerminalState).is_warning());
        assert_eq!(
            CliError::Watch(WatchError::RemoteFailure("boom".to_string())).exit_code(),
            1
        );
        assert_eq!(CliError::Interrupted.exit_code(), 130);
        assert!(CliError::Interrupted.is_warning());
    }

    #[test]
    fn test_api_error_maps_to_transport() {
        let err: WatchError = CliError::ApiError {
            status: 500,
            body: "boom".to_string(),
        }
        .into();
        assert_eq!(err, WatchError::Transport("API error (500): boom".to_string()));
    }
}
