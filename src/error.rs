//! Error types for the model repository resolver

use thiserror::Error;

/// Result type for resolver operations
pub type Result<T> = std::result::Result<T, ResolverError>;

/// Model repository resolver errors
#[derive(Error, Debug)]
pub enum ResolverError {
    #[error("Invalid DTMI format: {0}")]
    InvalidDtmiFormat(String),

    #[error("Repository directory not found: {path}")]
    RepositoryNotFound { path: String },

    #[error("Model \"{dtmi}\" not found at {path}")]
    ModelNotFound { dtmi: String, path: String },

    #[error("Failed fetching \"{dtmi}\" from {url}: {reason}")]
    TransportFailure {
        dtmi: String,
        url: String,
        reason: String,
    },

    #[error("Retrieved model id \"{retrieved}\" does not match requested id \"{requested}\" (comparison is case sensitive)")]
    CasingMismatch { requested: String, retrieved: String },

    #[error("Model is missing a root \"@id\" element")]
    MissingRootId,

    #[error("Model file does not adhere to repository path conventions; expected {expected}")]
    PathConventionViolation { expected: String },

    #[error("Ids do not start with the root namespace \"{namespace}\": {}", offenders.join(", "))]
    NamespaceViolation {
        namespace: String,
        offenders: Vec<String>,
    },

    #[error("Ids contain reserved words: {}", offenders.join(", "))]
    ReservedWordViolation { offenders: Vec<String> },

    #[error("Failed processing {path}: {reason}")]
    ProcessingError { path: String, reason: String },

    #[error("Strict validation requires a single root model object, not an array")]
    StrictModeArrayInput,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
