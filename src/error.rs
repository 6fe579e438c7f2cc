// Error handling module
// Defines the error taxonomy of the OAuth step

use thiserror::Error;

/// Missing or inconsistent inputs, detected before any network activity
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    /// Required input is absent
    #[error("{input} is required {reason}")]
    MissingInput {
        input: &'static str,
        reason: &'static str,
    },
}

/// Token refresh failures. These never abort the step.
#[derive(Error, Debug)]
pub enum RefreshError {
    /// Request could not be sent or the response could not be read
    #[error("Token refresh request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Authorization server answered with a non-success status
    #[error("Token refresh failed: {status} - {body}")]
    Status { status: u16, body: String },

    /// Success status but unusable body
    #[error("Malformed token refresh response: {0}")]
    MalformedResponse(String),
}

impl RefreshError {
    /// HTTP status of the failed exchange, if one was received
    pub fn status(&self) -> Option<u16> {
        match self {
            RefreshError::Status { status, .. } => Some(*status),
            RefreshError::Transport(e) => e.status().map(|s| s.as_u16()),
            RefreshError::MalformedResponse(_) => None,
        }
    }
}

/// Failure writing a single secret
#[derive(Error, Debug)]
pub enum SecretStoreError {
    /// Writer process could not be started or awaited
    #[error("Failed to run secret writer: {0}")]
    Io(#[from] std::io::Error),

    /// Writer process exited unsuccessfully
    #[error("Secret writer exited with {code:?}: {stderr}")]
    Command { code: Option<i32>, stderr: String },

    /// Store rejected the write
    #[error("Secret store rejected write: {0}")]
    Rejected(String),
}

/// Secret propagation aborted part-way
#[derive(Error, Debug)]
#[error("Failed to update secret {secret} ({} of {total} already written): {source}", .written.len())]
pub struct PropagationError {
    /// Secret whose write failed
    pub secret: &'static str,
    /// Secrets written before the failure
    pub written: Vec<&'static str>,
    /// Number of secrets in a full update
    pub total: usize,
    #[source]
    pub source: SecretStoreError,
}

/// Errors that fail the whole step
#[derive(Error, Debug)]
pub enum ActionError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Refreshed credentials could not be persisted
    #[error("Secret propagation error: {0}")]
    Propagation(#[from] PropagationError),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// Result type alias for step operations
pub type Result<T> = std::result::Result<T, ActionError>;
