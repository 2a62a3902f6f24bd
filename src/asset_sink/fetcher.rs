//! Remote image retrieval
//!
//! The sink only needs "give me the bytes behind this URL". [`HttpImageFetcher`]
//! is the production implementation; tests plug in their own [`ImageFetcher`].

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;

use super::errors::{AssetError, AssetResult};
use super::types::{FetchedImage, mime_for_extension};
use crate::utils::constants::{CHROME_USER_AGENT, DEFAULT_FETCH_ATTEMPTS, MAX_IMAGE_BYTES};
use crate::utils::url_extension;

/// Source of remote image bodies.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch one image. Implementations own their retry policy; an `Err`
    /// means every attempt failed.
    async fn fetch(&self, url: &str) -> AssetResult<FetchedImage>;
}

/// Configuration for download timeouts, retries and size limits
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Timeout of a single request
    pub timeout: Duration,
    /// Total attempts per URL, including the first
    pub max_attempts: u32,
    /// Backoff unit; attempt `n` waits `n * retry_delay` before retrying
    pub retry_delay: Duration,
    /// Maximum accepted body size (bytes)
    pub max_bytes: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_attempts: DEFAULT_FETCH_ATTEMPTS,
            retry_delay: Duration::from_millis(500),
            max_bytes: MAX_IMAGE_BYTES,
        }
    }
}

/// `reqwest`-backed fetcher with bounded retries.
#[derive(Debug, Clone)]
pub struct HttpImageFetcher {
    client: Client,
    config: FetchConfig,
}

impl Default for HttpImageFetcher {
    fn default() -> Self {
        Self::new(FetchConfig::default())
    }
}

impl HttpImageFetcher {
    #[must_use]
    pub fn new(config: FetchConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn with_client(client: Client, config: FetchConfig) -> Self {
        Self { client, config }
    }

    #[must_use]
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// One attempt: request, status check, streamed body under the size cap.
    async fn fetch_once(&self, url: &str) -> Result<FetchedImage, String> {
        let response = self
            .client
            .get(url)
            .timeout(self.config.timeout)
            .header("User-Agent", CHROME_USER_AGENT)
            .header("Accept", "image/avif,image/webp,image/apng,image/*,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        if !response.status().is_success() {
            return Err(format!("status {}", response.status()));
        }

        let header_mime = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or("").trim().to_string())
            .filter(|v| v.starts_with("image/"));

        let expected_size = response.content_length().unwrap_or(0);
        if expected_size > self.config.max_bytes as u64 {
            return Err(format!(
                "image too large: {expected_size} bytes exceeds limit of {} bytes",
                self.config.max_bytes
            ));
        }

        let mut buffer = Vec::with_capacity(usize::try_from(expected_size).unwrap_or(0));
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| format!("failed to read body: {e}"))?;
            if buffer.len() + chunk.len() > self.config.max_bytes {
                return Err(format!(
                    "image exceeded size limit during download (max: {})",
                    self.config.max_bytes
                ));
            }
            buffer.extend_from_slice(&chunk);
        }

        let mime_type = header_mime.unwrap_or_else(|| {
            url_extension(url)
                .map(|ext| mime_for_extension(&ext).to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string())
        });

        Ok(FetchedImage {
            bytes: buffer,
            mime_type,
        })
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> AssetResult<FetchedImage> {
        let attempts = self.config.max_attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match self.fetch_once(url).await {
                Ok(image) => {
                    log::debug!(
                        "Fetched {url} ({} bytes, {}) on attempt {attempt}",
                        image.bytes.len(),
                        image.mime_type
                    );
                    return Ok(image);
                }
                Err(e) => {
                    log::warn!("Image fetch attempt {attempt}/{attempts} for {url} failed: {e}");
                    last_error = e;
                    if attempt < attempts {
                        tokio::time::sleep(self.config.retry_delay * attempt).await;
                    }
                }
            }
        }

        Err(AssetError::Fetch {
            url: url.to_string(),
            attempts,
            message: last_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> FetchConfig {
        FetchConfig {
            timeout: Duration::from_secs(5),
            max_attempts: 3,
            retry_delay: Duration::from_millis(1),
            max_bytes: 64,
        }
    }

    #[tokio::test]
    async fn test_fetch_success_uses_content_type() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/a.png")
            .with_status(200)
            .with_header("content-type", "image/gif")
            .with_body([1u8, 2, 3])
            .create_async()
            .await;

        let fetcher = HttpImageFetcher::new(fast_config());
        let image = fetcher.fetch(&format!("{}/a.png", server.url())).await.unwrap();
        assert_eq!(image.bytes, vec![1, 2, 3]);
        assert_eq!(image.mime_type, "image/gif");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_falls_back_to_extension_mime() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/pic.webp")
            .with_status(200)
            .with_header("content-type", "application/octet-stream")
            .with_body("x")
            .create_async()
            .await;

        let fetcher = HttpImageFetcher::new(fast_config());
        let image = fetcher.fetch(&format!("{}/pic.webp", server.url())).await.unwrap();
        assert_eq!(image.mime_type, "image/webp");
    }

    #[tokio::test]
    async fn test_fetch_exhausts_retries() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/missing.png")
            .with_status(500)
            .expect(3)
            .create_async()
            .await;

        let fetcher = HttpImageFetcher::new(fast_config());
        let err = fetcher
            .fetch(&format!("{}/missing.png", server.url()))
            .await
            .unwrap_err();
        match err {
            AssetError::Fetch { attempts, message, .. } => {
                assert_eq!(attempts, 3);
                assert!(message.contains("500"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_rejects_oversized_body() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/big.png")
            .with_status(200)
            .with_body(vec![0u8; 128])
            .create_async()
            .await;

        let fetcher = HttpImageFetcher::new(FetchConfig {
            max_attempts: 1,
            ..fast_config()
        });
        let err = fetcher.fetch(&format!("{}/big.png", server.url())).await.unwrap_err();
        assert!(err.to_string().contains("too large") || err.to_string().contains("size limit"));
    }
}
