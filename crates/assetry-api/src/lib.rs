//! # assetry-api
//!
//! HTTP surface for assetry: media type CRUD, dimension linking for authoring
//! forms, and AI metadata suggestions.
//!
//! The binary in `main.rs` wires configuration and logging; this library holds
//! the router so integration tests can serve it on an ephemeral port.

pub mod handlers;
pub mod openapi;

use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower::ServiceBuilder;
use tower_http::{
    map_response_body::MapResponseBodyLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    trace::TraceLayer,
};
use tracing::{error, warn};

use assetry_core::defaults::{SERVER_BODY_LIMIT_BYTES, SERVER_PORT};
use assetry_core::MediaTypeRegistry;
use assetry_inference::{MediaSourceFetcher, SuggestionOrchestrator};

/// Shared handler state. Every member is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub registry: MediaTypeRegistry,
    pub orchestrator: SuggestionOrchestrator,
    pub fetcher: MediaSourceFetcher,
}

// =============================================================================
// SERVER CONFIGURATION
// =============================================================================

/// Listener and middleware settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum request body size. Suggestion uploads carry base64 media.
    pub body_limit_bytes: usize,
    /// Origins allowed by CORS. Empty disables cross-origin access.
    pub allowed_origins: Vec<HeaderValue>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: SERVER_PORT,
            body_limit_bytes: SERVER_BODY_LIMIT_BYTES,
            allowed_origins: vec![HeaderValue::from_static("http://localhost:3000")],
        }
    }
}

impl ServerConfig {
    /// Load from `HOST`, `PORT`, `SERVER_BODY_LIMIT_BYTES` and
    /// `CORS_ALLOWED_ORIGINS`. Unparseable values keep the default.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let host = std::env::var("HOST").unwrap_or(defaults.host);
        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.port);
        let body_limit_bytes = std::env::var("SERVER_BODY_LIMIT_BYTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(defaults.body_limit_bytes);
        let allowed_origins = match std::env::var("CORS_ALLOWED_ORIGINS") {
            Ok(raw) => parse_allowed_origins(&raw),
            Err(_) => defaults.allowed_origins,
        };

        Self {
            host,
            port,
            body_limit_bytes,
            allowed_origins,
        }
    }
}

/// Parse a comma-separated origin list, skipping entries that are not valid
/// header values.
pub fn parse_allowed_origins(raw: &str) -> Vec<HeaderValue> {
    raw.split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}

// =============================================================================
// ROUTER
// =============================================================================

/// Build the full application router.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    use handlers::{dimensions, media_types, suggestions};

    Router::new()
        .route("/health", get(health_check))
        .route("/api-docs/openapi.json", get(openapi::openapi_json))
        // Media types
        .route(
            "/api/v1/media-types",
            get(media_types::list_media_types).post(media_types::create_media_type),
        )
        .route(
            "/api/v1/media-types/:id",
            get(media_types::get_media_type)
                .patch(media_types::update_media_type)
                .delete(media_types::delete_media_type),
        )
        .route(
            "/api/v1/media-types/:id/validate-metadata",
            post(media_types::validate_media_metadata),
        )
        // Dimension linking
        .route(
            "/api/v1/aspect-ratios",
            get(dimensions::list_aspect_ratios),
        )
        .route("/api/v1/dimensions/link", post(dimensions::link_dimensions))
        // Suggestions
        .route("/api/v1/suggestions", post(suggestions::suggest_metadata))
        .route(
            "/api/v1/suggestions/from-url",
            post(suggestions::suggest_metadata_from_url),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(
                    CorsLayer::new()
                        .allow_origin(AllowOrigin::list(config.allowed_origins.clone()))
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::PATCH,
                            Method::DELETE,
                            Method::OPTIONS,
                        ])
                        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
                        .max_age(Duration::from_secs(3600)),
                )
                .layer(MapResponseBodyLayer::new(axum::body::Body::new))
                .layer(DefaultBodyLimit::disable())
                .layer(RequestBodyLimitLayer::new(config.body_limit_bytes)),
        )
        .with_state(state)
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

// =============================================================================
// ERROR HANDLING
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    /// A schema rule failed on `field`.
    Validation { field: String, message: String },
    Forbidden(String),
    NotFound(String),
    Conflict(String),
    PayloadTooLarge(String),
    TooManyRequests(String),
    ServiceUnavailable(String),
    Internal(String),
}

impl From<assetry_core::Error> for ApiError {
    fn from(err: assetry_core::Error) -> Self {
        use assetry_core::Error;

        match err {
            Error::SchemaValidation { ref field, .. } => ApiError::Validation {
                field: field.clone(),
                message: err.to_string(),
            },
            Error::InvalidInput(msg) => ApiError::BadRequest(msg),
            Error::NotFound(msg) => ApiError::NotFound(msg),
            Error::MediaTypeNotFound(_) => ApiError::NotFound(err.to_string()),
            Error::ReferentialIntegrity { .. } => ApiError::Conflict(err.to_string()),
            Error::ForbiddenSource(_) => ApiError::Forbidden(err.to_string()),
            Error::InferenceQuota(_) => ApiError::TooManyRequests(err.user_message()),
            Error::PayloadTooLarge(_) => ApiError::PayloadTooLarge(err.user_message()),
            Error::InferenceAuth(_) | Error::ModelUnavailable(_) | Error::Config(_) => {
                ApiError::ServiceUnavailable(err.user_message())
            }
            other => {
                error!(subsystem = "api", error = %other, "Unhandled error");
                ApiError::Internal(other.to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ApiError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                serde_json::json!({ "error": message, "field": field }),
            ),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, error_body(msg)),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, error_body(msg)),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, error_body(msg)),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, error_body(msg)),
            ApiError::PayloadTooLarge(msg) => (StatusCode::PAYLOAD_TOO_LARGE, error_body(msg)),
            ApiError::TooManyRequests(msg) => (StatusCode::TOO_MANY_REQUESTS, error_body(msg)),
            ApiError::ServiceUnavailable(msg) => {
                (StatusCode::SERVICE_UNAVAILABLE, error_body(msg))
            }
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, error_body(msg)),
        };

        (status, Json(body)).into_response()
    }
}

fn error_body(message: String) -> serde_json::Value {
    serde_json::json!({ "error": message })
}
