// SPDX-License-Identifier: MPL-2.0

//! HTTP client for the counting service

use super::types::CountResponse;
use crate::constants::upload;
use crate::errors::UploadError;
use crate::pipelines::photo::EncodedImage;
use chrono::{DateTime, Utc};
use reqwest::multipart::{Form, Part};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, info};

/// Where and how to reach the counting service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadConfig {
    /// Base URL, e.g. `http://localhost:8000`
    pub api_url: String,
    pub timeout: Duration,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            api_url: upload::DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(upload::DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl UploadConfig {
    /// Full URL of a route below the base URL
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_url.trim_end_matches('/'), path)
    }
}

/// Something that can count the flowers in an image
pub trait CountingService: Send + Sync {
    fn count(
        &self,
        image: &EncodedImage,
    ) -> impl Future<Output = Result<CountResponse, UploadError>> + Send;
}

/// Filename sent with an upload: the capture's epoch milliseconds
pub fn upload_filename(now: DateTime<Utc>) -> String {
    format!("{}.png", now.timestamp_millis())
}

#[derive(Debug, Clone)]
pub struct CountingClient {
    client: reqwest::Client,
    config: UploadConfig,
}

impl CountingClient {
    pub fn new(config: &UploadConfig) -> Result<Self, UploadError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| UploadError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Upload one image and return the service's count
    ///
    /// Non-PNG images are converted first. Any non-2xx status is an error.
    pub async fn count_flowers(&self, image: &EncodedImage) -> Result<CountResponse, UploadError> {
        let png = image.to_png()?;
        let url = self.config.endpoint(upload::UPLOAD_PATH);
        let filename = upload_filename(Utc::now());

        debug!(url = %url, filename = %filename, size = png.data.len(), "Uploading image");

        let form = Form::new().part(
            upload::FILE_FIELD,
            Part::bytes(png.data.to_vec())
                .file_name(filename)
                .mime_str(png.format.mime_type())?,
        );

        let resp = self.client.post(&url).multipart(form).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "Counting service rejected upload");
            return Err(UploadError::Status(status.as_u16()));
        }

        let result: CountResponse = resp.json().await?;
        info!(flowers_count = result.flowers_count, "Flowers counted");
        Ok(result)
    }

    /// Check that the service is reachable
    pub async fn ping(&self) -> Result<(), UploadError> {
        let url = self.config.endpoint(upload::PING_PATH);
        let resp = self.client.get(&url).send().await?;

        if !resp.status().is_success() {
            return Err(UploadError::Status(resp.status().as_u16()));
        }
        debug!(url = %url, "Counting service reachable");
        Ok(())
    }
}

impl CountingService for CountingClient {
    fn count(
        &self,
        image: &EncodedImage,
    ) -> impl Future<Output = Result<CountResponse, UploadError>> + Send {
        self.count_flowers(image)
    }
}
