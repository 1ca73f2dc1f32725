// ABOUTME: Typed errors for roster validation, roster persistence and remote sessions
// ABOUTME: Messages name hosts and users but never carry a password

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Boxed cause carried by session failures (ssh2, io, or anything a test double produces).
pub type Cause = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    EmptyField(&'static str),
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read roster file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("roster file {} is malformed: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize roster: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("roster file {} could not be read, refusing to overwrite it", .path.display())]
    Unreadable { path: PathBuf },

    #[error("failed to write roster file {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error("no roster entry matches {0}")]
    NotFound(String),
}

/// Per-host failure of a remote session. Never aborts a batch.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to connect to {address}: {source}")]
    ConnectFailed {
        address: String,
        #[source]
        source: Cause,
    },

    #[error("authentication failed for {username}@{address}: {source}")]
    AuthFailed {
        address: String,
        username: String,
        #[source]
        source: Cause,
    },

    #[error("command failed on {address}: {source}")]
    CommandFailed {
        address: String,
        #[source]
        source: Cause,
    },
}

impl SessionError {
    pub fn connect(address: &str, source: impl Into<Cause>) -> Self {
        SessionError::ConnectFailed {
            address: address.to_string(),
            source: source.into(),
        }
    }

    pub fn auth(address: &str, username: &str, source: impl Into<Cause>) -> Self {
        SessionError::AuthFailed {
            address: address.to_string(),
            username: username.to_string(),
            source: source.into(),
        }
    }

    pub fn command(address: &str, source: impl Into<Cause>) -> Self {
        SessionError::CommandFailed {
            address: address.to_string(),
            source: source.into(),
        }
    }

    /// Short label for tabular output.
    pub fn kind(&self) -> &'static str {
        match self {
            SessionError::ConnectFailed { .. } => "connect failed",
            SessionError::AuthFailed { .. } => "auth failed",
            SessionError::CommandFailed { .. } => "command failed",
        }
    }
}
