//! External image-safety scanner client

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use safechat_common::ModerationConfig;
use safechat_core::Snowflake;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Payload posted to the scanner
#[derive(Debug, Clone, Serialize)]
pub struct ImageScanRequest {
    pub message_id: Snowflake,
    pub image_url: String,
    pub sender_id: Snowflake,
    pub chat_id: Snowflake,
}

/// Scanner answer
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ImageVerdict {
    pub flagged: bool,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("image scanning is not configured")]
    Disabled,

    #[error("scanner request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("scanner returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid scanner response: {0}")]
    InvalidResponse(String),
}

#[async_trait]
pub trait ImageScanner: Send + Sync {
    async fn scan(&self, request: &ImageScanRequest) -> Result<ImageVerdict, ScanError>;
}

/// Posts JSON to a configured HTTP endpoint
#[derive(Debug, Clone)]
pub struct HttpImageScanner {
    client: reqwest::Client,
    url: String,
}

impl HttpImageScanner {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ScanError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl ImageScanner for HttpImageScanner {
    async fn scan(&self, request: &ImageScanRequest) -> Result<ImageVerdict, ScanError> {
        let resp = self.client.post(&self.url).json(request).send().await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(ScanError::Status { status, body });
        }

        resp.json::<ImageVerdict>()
            .await
            .map_err(|e| ScanError::InvalidResponse(e.to_string()))
    }
}

/// Used when no scanner URL is configured; every scan is skipped
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledImageScanner;

#[async_trait]
impl ImageScanner for DisabledImageScanner {
    async fn scan(&self, _request: &ImageScanRequest) -> Result<ImageVerdict, ScanError> {
        Err(ScanError::Disabled)
    }
}

/// Build the scanner the config asks for
pub fn scanner_from_config(config: &ModerationConfig) -> Result<Arc<dyn ImageScanner>, ScanError> {
    match &config.image_scanner_url {
        Some(url) => Ok(Arc::new(HttpImageScanner::new(
            url.clone(),
            Duration::from_secs(config.image_scanner_timeout_secs),
        )?)),
        None => {
            warn!("IMAGE_SCANNER_URL not set, image moderation disabled");
            Ok(Arc::new(DisabledImageScanner))
        }
    }
}
