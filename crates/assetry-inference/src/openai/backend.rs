//! OpenAI-compatible vision backend implementation.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use tracing::{debug, info, warn};

use assetry_core::{Error, Result};

use super::error::{to_core_error, OpenAIErrorCode};
use super::types::*;
use crate::config::InferenceConfig;
use crate::vision::{ResponseFormat, VisionBackend, VisionRequest};

/// Vision backend for any OpenAI-compatible chat completions endpoint that
/// accepts inline `data:` URLs.
pub struct OpenAIVisionBackend {
    client: Client,
    config: InferenceConfig,
}

impl OpenAIVisionBackend {
    pub fn new(config: InferenceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| Error::Inference(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            subsystem = "inference",
            component = "openai",
            base_url = %config.base_url,
            model = %config.model,
            "Initializing OpenAI-compatible vision backend"
        );

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &InferenceConfig {
        &self.config
    }

    /// Build a request with authentication if configured.
    fn build_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let mut req = self.client.post(&url);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        req.header("Content-Type", "application/json")
    }

    fn build_get_request(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
        let mut req = self.client.get(&url);

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        req
    }

    fn to_completion_request(request: &VisionRequest<'_>) -> ChatCompletionRequest {
        let data_url = format!(
            "data:{};base64,{}",
            request.mime_type,
            base64::engine::general_purpose::STANDARD.encode(request.media)
        );

        ChatCompletionRequest {
            model: request.model.clone(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: vec![
                    ContentPart::Text {
                        text: request.prompt.clone(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_url },
                    },
                ],
            }],
            temperature: Some(request.temperature),
            max_tokens: Some(request.max_output_tokens),
            response_format: match request.response_format {
                ResponseFormat::Json => Some(ResponseFormatSpec::json_object()),
                ResponseFormat::Text => None,
            },
        }
    }
}

#[async_trait]
impl VisionBackend for OpenAIVisionBackend {
    async fn generate(&self, request: &VisionRequest<'_>) -> Result<String> {
        if self.config.api_key.is_none() {
            return Err(Error::Config(
                "inference API key is not configured".to_string(),
            ));
        }

        let start = Instant::now();
        debug!(
            subsystem = "inference",
            component = "openai",
            op = "generate",
            model = %request.model,
            mime_type = %request.mime_type,
            media_bytes = request.media.len(),
            prompt_len = request.prompt.len(),
            "Sending vision request"
        );

        let body = Self::to_completion_request(request);
        let response = self
            .build_request("/chat/completions")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Inference(format!("Request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let (kind, message) = match serde_json::from_str::<OpenAIErrorResponse>(&text) {
                Ok(body) => (body.error.kind(), body.error.message),
                Err(_) => (String::new(), text),
            };
            let code = OpenAIErrorCode::from_response(status.as_u16(), &kind);
            warn!(
                subsystem = "inference",
                component = "openai",
                op = "generate",
                status = status.as_u16(),
                error_kind = %kind,
                code = ?code,
                "Vision request rejected"
            );
            return Err(to_core_error(
                code,
                status.as_u16(),
                &format!("provider returned {}: {}", status, message),
            ));
        }

        let result: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Inference(format!("Failed to parse response: {}", e)))?;

        let choice = result
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::Inference("response contained no choices".to_string()))?;
        let content = choice.message.content.unwrap_or_default();
        if content.trim().is_empty() {
            return Err(Error::Inference("response content was empty".to_string()));
        }

        debug!(
            subsystem = "inference",
            component = "openai",
            op = "generate",
            model = %request.model,
            response_len = content.len(),
            finish_reason = choice.finish_reason.as_deref().unwrap_or("unknown"),
            duration_ms = start.elapsed().as_millis() as u64,
            "Vision request complete"
        );
        Ok(content)
    }

    async fn health_check(&self) -> Result<bool> {
        let response = self
            .build_get_request("/models")
            .timeout(Duration::from_secs(5))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => Ok(true),
            Ok(resp) => {
                warn!(
                    subsystem = "inference",
                    component = "openai",
                    status = resp.status().as_u16(),
                    "Vision backend health check failed"
                );
                Ok(false)
            }
            Err(e) => {
                warn!(
                    subsystem = "inference",
                    component = "openai",
                    error = %e,
                    "Vision backend unreachable"
                );
                Ok(false)
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
