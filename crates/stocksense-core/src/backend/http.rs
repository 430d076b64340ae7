//! reqwest-based backend client

use super::{AnalysisBackend, BackendResponse};
use crate::config::ClientConfig;
use crate::error::{Result, SenseError};
use crate::ticker::Ticker;
use async_trait::async_trait;
use reqwest::RequestBuilder;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// HTTP client for the analysis backend
///
/// Every request carries its own timeout: health, trigger and poll each use
/// the value from [`ClientConfig`].
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: Url,
    health_timeout: Duration,
    trigger_timeout: Duration,
    poll_timeout: Duration,
}

impl HttpBackend {
    /// Create a client from validated configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| SenseError::Config(format!("Failed to create HTTP client: {e}")))?;

        Self::with_client(client, config)
    }

    /// Create a client reusing an existing `reqwest::Client`
    pub fn with_client(client: reqwest::Client, config: &ClientConfig) -> Result<Self> {
        Ok(Self {
            client,
            base_url: config.backend_url()?,
            health_timeout: config.health_timeout,
            trigger_timeout: config.trigger_timeout,
            poll_timeout: config.poll_timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append path segments to the base URL
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                SenseError::Config(format!("Backend URL cannot be a base: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send(
        request: RequestBuilder,
        timeout: Duration,
    ) -> std::result::Result<BackendResponse, reqwest::Error> {
        let response = request.timeout(timeout).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(BackendResponse { status, body })
    }
}

#[async_trait]
impl AnalysisBackend for HttpBackend {
    async fn health(&self) -> Result<BackendResponse> {
        let url = self.endpoint(&["health"])?;
        debug!("GET {}", url);
        Ok(Self::send(self.client.get(url), self.health_timeout).await?)
    }

    async fn trigger(&self, ticker: &Ticker) -> Result<BackendResponse> {
        let url = self.endpoint(&["analyze", ticker.as_str()])?;
        debug!("POST {}", url);
        Self::send(self.client.post(url), self.trigger_timeout)
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SenseError::TriggerTimedOut(e.to_string())
                } else {
                    SenseError::from(e)
                }
            })
    }

    async fn fetch_results(&self, ticker: &Ticker) -> Result<BackendResponse> {
        let url = self.endpoint(&["results", ticker.as_str()])?;
        debug!("GET {}", url);
        Ok(Self::send(self.client.get(url), self.poll_timeout).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(url: &str) -> HttpBackend {
        let config = ClientConfig::builder().backend_url(url).build().unwrap();
        HttpBackend::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_on_root_url() {
        let backend = client_for("http://127.0.0.1:8000");
        let ticker = Ticker::parse("brk.b").unwrap();
        assert_eq!(
            backend.endpoint(&["analyze", ticker.as_str()]).unwrap().as_str(),
            "http://127.0.0.1:8000/analyze/BRK.B"
        );
        assert_eq!(
            backend.endpoint(&["health"]).unwrap().as_str(),
            "http://127.0.0.1:8000/health"
        );
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let backend = client_for("https://example.com/api/");
        assert_eq!(
            backend.endpoint(&["results", "AAPL"]).unwrap().as_str(),
            "https://example.com/api/results/AAPL"
        );

        let backend = client_for("https://example.com/api");
        assert_eq!(
            backend.endpoint(&["results", "AAPL"]).unwrap().as_str(),
            "https://example.com/api/results/AAPL"
        );
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_connectivity_error() {
        // Port 9 (discard) on localhost is expected to refuse connections
        let config = ClientConfig::builder()
            .backend_url("http://127.0.0.1:9")
            .health_timeout(Duration::from_millis(500))
            .build()
            .unwrap();
        let backend = HttpBackend::new(&config).unwrap();

        let result = backend.health().await;
        assert!(matches!(result, Err(SenseError::Connectivity(_))));
    }
}
