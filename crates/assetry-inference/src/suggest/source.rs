//! Fetching media from remote URLs for suggestions.
//!
//! [`MediaSourcePolicy`] is checked before any network call: the URL must be
//! HTTPS and its host must equal a trusted host or be a subdomain of one.
//! Redirects are checked against the same policy.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::{redirect, Client, Url};
use tracing::{debug, info, warn};

use assetry_core::{Error, Result};

use crate::config::MediaSourceConfig;

const MAX_REDIRECTS: usize = 5;

/// Host allow-list for remote media.
#[derive(Debug, Clone, Default)]
pub struct MediaSourcePolicy {
    allowed_hosts: Vec<String>,
}

impl MediaSourcePolicy {
    pub fn new<I, S>(hosts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            allowed_hosts: hosts
                .into_iter()
                .map(|h| h.as_ref().trim().trim_start_matches('.').to_lowercase())
                .filter(|h| !h.is_empty())
                .collect(),
        }
    }

    pub fn allowed_hosts(&self) -> &[String] {
        &self.allowed_hosts
    }

    /// Parse `raw` and check it against the policy.
    pub fn check(&self, raw: &str) -> Result<Url> {
        let url = Url::parse(raw.trim())
            .map_err(|e| Error::ForbiddenSource(format!("invalid URL: {}", e)))?;
        self.check_url(&url)?;
        Ok(url)
    }

    pub fn check_url(&self, url: &Url) -> Result<()> {
        if url.scheme() != "https" {
            return Err(Error::ForbiddenSource(format!(
                "only https URLs are allowed, got {}",
                url.scheme()
            )));
        }
        let host = url
            .host_str()
            .map(|h| h.trim_end_matches('.').to_lowercase())
            .ok_or_else(|| Error::ForbiddenSource("URL has no host".to_string()))?;

        if self.is_trusted_host(&host) {
            Ok(())
        } else {
            Err(Error::ForbiddenSource(format!(
                "host '{}' is not in the trusted list",
                host
            )))
        }
    }

    fn is_trusted_host(&self, host: &str) -> bool {
        self.allowed_hosts.iter().any(|allowed| {
            host == allowed
                || host
                    .strip_suffix(allowed.as_str())
                    .is_some_and(|prefix| prefix.ends_with('.'))
        })
    }
}

/// Media downloaded from a trusted source.
#[derive(Debug, Clone)]
pub struct FetchedMedia {
    pub data: Vec<u8>,
    pub mime_type: String,
    pub filename: String,
}

/// Downloads media from URLs allowed by a [`MediaSourcePolicy`], up to a size
/// cap.
#[derive(Clone)]
pub struct MediaSourceFetcher {
    client: Client,
    policy: Arc<MediaSourcePolicy>,
    max_bytes: usize,
}

impl MediaSourceFetcher {
    pub fn new(config: &MediaSourceConfig) -> Result<Self> {
        let policy = Arc::new(MediaSourcePolicy::new(&config.allowed_hosts));
        let redirect_policy = {
            let policy = policy.clone();
            redirect::Policy::custom(move |attempt| {
                if attempt.previous().len() >= MAX_REDIRECTS {
                    attempt.error("too many redirects")
                } else if policy.check_url(attempt.url()).is_ok() {
                    attempt.follow()
                } else {
                    attempt.error("redirect target is not a trusted media source")
                }
            })
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .redirect(redirect_policy)
            .build()
            .map_err(|e| Error::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            policy,
            max_bytes: config.max_bytes,
        })
    }

    pub fn policy(&self) -> &MediaSourcePolicy {
        &self.policy
    }

    /// Check `raw` against the policy, then download it.
    pub async fn fetch(&self, raw: &str) -> Result<FetchedMedia> {
        let url = self.policy.check(raw).inspect_err(|e| {
            warn!(
                subsystem = "inference",
                component = "media_source",
                op = "fetch",
                error = %e,
                "Media source rejected"
            );
        })?;
        self.download(url).await
    }

    async fn download(&self, url: Url) -> Result<FetchedMedia> {
        let start = Instant::now();
        let mut response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| Error::Request(format!("Media fetch failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Request(format!(
                "Media source returned {}",
                response.status()
            )));
        }

        if let Some(length) = response.content_length() {
            if length > self.max_bytes as u64 {
                return Err(too_large(self.max_bytes));
            }
        }

        let declared = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let mut data = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| Error::Request(format!("Media fetch failed: {}", e)))?
        {
            if data.len() + chunk.len() > self.max_bytes {
                return Err(too_large(self.max_bytes));
            }
            data.extend_from_slice(&chunk);
        }

        let mime_type = detect_mime_type(declared.as_deref(), &data);
        let filename = filename_from_url(&url);
        info!(
            subsystem = "inference",
            component = "media_source",
            op = "fetch",
            host = url.host_str().unwrap_or_default(),
            media_bytes = data.len(),
            mime_type = %mime_type,
            duration_ms = start.elapsed().as_millis() as u64,
            "Media fetched"
        );

        Ok(FetchedMedia {
            data,
            mime_type,
            filename,
        })
    }
}

fn too_large(max_bytes: usize) -> Error {
    Error::PayloadTooLarge(format!("media exceeds the {} byte limit", max_bytes))
}

/// The declared Content-Type without parameters, unless it is missing or
/// generic, in which case the bytes decide.
pub fn detect_mime_type(declared: Option<&str>, data: &[u8]) -> String {
    let declared = declared
        .and_then(|v| v.split(';').next())
        .map(|v| v.trim().to_lowercase())
        .filter(|v| !v.is_empty() && v != "application/octet-stream");

    match declared {
        Some(mime) => mime,
        None => {
            let detected = infer::get(data).map(|t| t.mime_type().to_string());
            debug!(
                subsystem = "inference",
                component = "media_source",
                detected = detected.as_deref().unwrap_or("none"),
                "Content-Type missing or generic, sniffed media bytes"
            );
            detected.unwrap_or_else(|| "application/octet-stream".to_string())
        }
    }
}

/// Last non-empty path segment, or `media` when there is none.
pub fn filename_from_url(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .map(str::to_string)
        .unwrap_or_else(|| "media".to_string())
}
