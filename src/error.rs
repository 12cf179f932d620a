//! Error Handling
//!
//! Error type definitions used in label-leader

use thiserror::Error;

use crate::diff::SyncAction;

pub type Result<T> = std::result::Result<T, Error>;

/// Error types for label-leader
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid rule pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("GitHub API error: {0}")]
    GitHubApi(#[from] octocrab::Error),

    #[error("Repository not found: {0}")]
    RepositoryNotFound(String),

    #[error("{repository}: {action} label {label} failed after {completed} completed job(s): {source}")]
    JobFailed {
        repository: String,
        label: String,
        action: SyncAction,
        completed: usize,
        #[source]
        source: Box<Error>,
    },

    #[error("label {0} is not among the leader's included labels")]
    UnknownLeaderLabel(String),

    #[error("prompt failed: {0}")]
    Prompt(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config(message.into())
    }

    /// Whether this error was raised while loading or validating configuration
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::Config(_) | Error::InvalidPattern { .. } | Error::Yaml(_)
        )
    }
}
