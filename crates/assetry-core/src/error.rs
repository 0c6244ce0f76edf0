//! Error types for assetry.

use thiserror::Error;
use uuid::Uuid;

/// Result type alias using assetry's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for assetry operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Media type definition not found
    #[error("Media type not found: {0}")]
    MediaTypeNotFound(Uuid),

    /// Required configuration (e.g. the inference credential) is missing or unusable
    #[error("Configuration error: {0}")]
    Config(String),

    /// A media type definition violated a schema rule; nothing was persisted
    #[error("Invalid {field}: {reason}")]
    SchemaValidation { field: String, reason: String },

    /// Delete refused while media items still reference the definition
    #[error("Media type {id} is still referenced by {references} media item(s)")]
    ReferentialIntegrity { id: Uuid, references: i64 },

    /// Media source URL is outside the trusted allow-list
    #[error("Forbidden media source: {0}")]
    ForbiddenSource(String),

    /// Inference reply could not be parsed, even after repair
    #[error("Suggestion parse error: {0}")]
    SuggestionParse(String),

    /// Inference service rejected the credential
    #[error("Inference authentication failed: {0}")]
    InferenceAuth(String),

    /// Inference quota or rate limit exhausted
    #[error("Inference quota exceeded: {0}")]
    InferenceQuota(String),

    /// Media payload exceeds what the inference service accepts
    #[error("Payload too large: {0}")]
    PayloadTooLarge(String),

    /// Inference model missing, overloaded or offline
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    /// Unclassified inference/generation failure
    #[error("Inference error: {0}")]
    Inference(String),

    /// Provider error status with no classified cause. The status already
    /// decided the class, so the message is never keyword-matched.
    #[error("Inference error: {message}")]
    InferenceStatus { status: u16, message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// HTTP/network request failed
    #[error("Request error: {0}")]
    Request(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a schema validation failure on `field`.
    pub fn schema(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::SchemaValidation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for the inference failures that are surfaced to the caller
    /// instead of being downgraded to a fallback suggestion.
    pub fn is_classified_inference(&self) -> bool {
        matches!(
            self,
            Error::InferenceAuth(_)
                | Error::InferenceQuota(_)
                | Error::PayloadTooLarge(_)
                | Error::ModelUnavailable(_)
        )
    }

    /// Message suitable for showing to an end user.
    ///
    /// Classified inference errors get a fixed, actionable sentence; the
    /// provider's raw text stays in the logs.
    pub fn user_message(&self) -> String {
        match self {
            Error::InferenceAuth(_) => {
                "The AI service rejected its credentials. Check the inference API key.".to_string()
            }
            Error::InferenceQuota(_) => {
                "The AI service quota has been exhausted. Try again later.".to_string()
            }
            Error::PayloadTooLarge(_) => {
                "This file is too large for AI suggestions. Try a smaller file.".to_string()
            }
            Error::ModelUnavailable(_) => {
                "The AI model is currently unavailable. Try again later.".to_string()
            }
            Error::Config(_) => "AI suggestions are not configured on this server.".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}
