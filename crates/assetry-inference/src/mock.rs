//! Scripted vision backend for deterministic testing.
//!
//! ```rust
//! use assetry_inference::mock::MockVisionBackend;
//!
//! let backend = MockVisionBackend::new()
//!     .with_reply(r#"{"title":"Sunset","tags":["sky"]}"#);
//! assert_eq!(backend.call_count(), 0);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use assetry_core::{Error, Result};

use crate::vision::{VisionBackend, VisionRequest};

#[derive(Debug, Clone)]
enum Scripted {
    Reply(String),
    Fail(String),
}

/// A call observed by the mock.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub model: String,
    pub prompt: String,
    pub mime_type: String,
    pub media_len: usize,
}

/// Returns scripted replies in order, then repeats the last one.
#[derive(Clone, Default)]
pub struct MockVisionBackend {
    script: Arc<Mutex<VecDeque<Scripted>>>,
    last: Arc<Mutex<Option<Scripted>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockVisionBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful raw reply.
    pub fn with_reply(self, raw: impl Into<String>) -> Self {
        self.push(Scripted::Reply(raw.into()));
        self
    }

    /// Queue a failure. The message becomes an unclassified
    /// [`Error::Inference`], the same shape a transport error has before
    /// classification.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.push(Scripted::Fail(message.into()));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn push(&self, item: Scripted) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(item);
        }
    }

    fn next(&self) -> Option<Scripted> {
        let popped = self.script.lock().ok().and_then(|mut s| s.pop_front());
        let mut last = self.last.lock().ok()?;
        if let Some(item) = popped {
            *last = Some(item);
        }
        last.clone()
    }
}

#[async_trait]
impl VisionBackend for MockVisionBackend {
    async fn generate(&self, request: &VisionRequest<'_>) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(MockCall {
                model: request.model.clone(),
                prompt: request.prompt.clone(),
                mime_type: request.mime_type.clone(),
                media_len: request.media.len(),
            });
        }
        match self.next() {
            Some(Scripted::Reply(raw)) => Ok(raw),
            Some(Scripted::Fail(message)) => Err(Error::Inference(message)),
            None => Err(Error::Inference("mock backend has no scripted reply".to_string())),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn model_name(&self) -> &str {
        "mock-vision"
    }
}
