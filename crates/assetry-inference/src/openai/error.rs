//! OpenAI-specific error handling.

use assetry_core::Error;

/// OpenAI-specific error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenAIErrorCode {
    /// Invalid or missing credentials.
    AuthenticationError,
    /// Billing quota exhausted.
    QuotaExceeded,
    /// Rate limit exceeded.
    RateLimitExceeded,
    /// Request body rejected as too large.
    PayloadTooLarge,
    /// Prompt plus media exceeds the model context.
    ContextLengthExceeded,
    /// Model not found or not available.
    ModelNotFound,
    /// Provider temporarily overloaded.
    Overloaded,
    /// Other server error.
    ServerError,
    Unknown,
}

impl OpenAIErrorCode {
    /// Determine error code from HTTP status and error type.
    pub fn from_response(status: u16, error_type: &str) -> Self {
        match (status, error_type) {
            (401 | 403, _) => Self::AuthenticationError,
            (_, "insufficient_quota") => Self::QuotaExceeded,
            (429, _) => Self::RateLimitExceeded,
            (413, _) => Self::PayloadTooLarge,
            (404, _) | (_, "model_not_found") => Self::ModelNotFound,
            (400, _) if error_type.contains("context_length") => Self::ContextLengthExceeded,
            (503 | 529, _) => Self::Overloaded,
            (500..=599, _) => Self::ServerError,
            _ => Self::Unknown,
        }
    }
}

/// Convert an OpenAI error to an assetry Error.
///
/// Server errors and unknown codes become [`Error::InferenceStatus`], which the
/// suggestion pipeline never re-classifies, so they fall back instead of being
/// surfaced.
pub fn to_core_error(code: OpenAIErrorCode, status: u16, message: &str) -> Error {
    match code {
        OpenAIErrorCode::AuthenticationError => Error::InferenceAuth(message.to_string()),
        OpenAIErrorCode::QuotaExceeded | OpenAIErrorCode::RateLimitExceeded => {
            Error::InferenceQuota(message.to_string())
        }
        OpenAIErrorCode::PayloadTooLarge | OpenAIErrorCode::ContextLengthExceeded => {
            Error::PayloadTooLarge(message.to_string())
        }
        OpenAIErrorCode::ModelNotFound | OpenAIErrorCode::Overloaded => {
            Error::ModelUnavailable(message.to_string())
        }
        OpenAIErrorCode::ServerError => Error::InferenceStatus {
            status,
            message: format!("Server error: {}", message),
        },
        OpenAIErrorCode::Unknown => Error::InferenceStatus {
            status,
            message: message.to_string(),
        },
    }
}
