//! Vision backend trait: one multimodal call per media item.

use async_trait::async_trait;

use assetry_core::Result;

/// Requested shape of the model's reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    Json,
    Text,
}

/// Everything sent to the model for one suggestion. Media bytes are borrowed
/// from the caller's context.
#[derive(Debug, Clone)]
pub struct VisionRequest<'a> {
    pub model: String,
    pub prompt: String,
    pub media: &'a [u8],
    pub mime_type: String,
    pub response_format: ResponseFormat,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

/// Backend for multimodal models that look at inline media and reply with text.
#[async_trait]
pub trait VisionBackend: Send + Sync {
    /// Run one request and return the model's raw text reply.
    async fn generate(&self, request: &VisionRequest<'_>) -> Result<String>;

    /// Check if the backend is reachable.
    async fn health_check(&self) -> Result<bool>;

    /// Model used when a request does not name one.
    fn model_name(&self) -> &str;
}
