//! Error taxonomy for plan definition and publishing.

use thiserror::Error;

/// A plan definition that cannot be published.
///
/// Always raised before any network traffic.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("invalid oid {oid:?}: {reason}")]
    InvalidOid { oid: String, reason: String },

    #[error("{field} must not be empty")]
    MissingField { field: String },

    #[error("plan must declare at least one stage")]
    NoStages,

    #[error("stage {stage:?} must declare at least one job")]
    EmptyStage { stage: String },

    #[error("job key {key} is declared more than once")]
    DuplicateJobKey { key: String },

    #[error("job {job}: artifact {name:?} is declared more than once")]
    DuplicateArtifact { job: String, name: String },

    #[error("job {job}: requirement {key:?} is declared more than once")]
    DuplicateRequirement { job: String, key: String },

    #[error("trigger {name:?} is declared more than once")]
    DuplicateTrigger { name: String },

    #[error("linked repository {name:?} is declared more than once")]
    DuplicateRepository { name: String },

    #[error("job {job}: requirement {key:?} is invalid: {reason}")]
    InvalidRequirement {
        job: String,
        key: String,
        reason: String,
    },

    #[error("job {job}: task #{index} is invalid: {reason}")]
    InvalidTask {
        job: String,
        index: usize,
        reason: String,
    },

    #[error("invalid pattern {pattern:?}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("branch cleanup threshold {field} must be at least one day")]
    InvalidCleanupThreshold { field: String },
}

/// Errors surfaced by a publish attempt.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("cannot reach CI server at {url}: {message}")]
    Connectivity { url: String, message: String },

    #[error("request to {url} timed out after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("authentication rejected by CI server: {0}")]
    Authentication(String),

    /// The server refused the plan; `message` is its response body, verbatim.
    #[error("CI server rejected plan (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PublishError {
    /// Whether re-invoking the publish could plausibly succeed without changes.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            PublishError::Connectivity { .. } | PublishError::Timeout { .. }
        )
    }
}

/// Result type for publish operations.
pub type Result<T> = std::result::Result<T, PublishError>;
