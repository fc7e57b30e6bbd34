//! HTTP transport
//!
//! Narrow interface between the polling engine and the HTTP client. Each
//! fetch resolves exactly once: success with the response payload, or a
//! typed failure. Timeouts and the redirect cap are process-wide transport
//! configuration, not per-entity.

use crate::error::TransportError;
use crate::request::RequestSpec;
use async_trait::async_trait;
use reqwest::redirect::Policy;
use std::time::Duration;
use tracing::debug;

/// Response delivered for a successfully fetched job
#[derive(Debug, Clone)]
pub struct PollResponse {
    /// HTTP status code
    pub status: u16,
    /// Raw response body
    pub body: String,
}

/// Process-wide transport parameters
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Maximum time to establish a connection
    pub connect_timeout: Duration,
    /// Maximum gap between reads before the request is abandoned
    pub idle_timeout: Duration,
    /// Maximum redirect hops to follow
    pub max_redirects: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            idle_timeout: Duration::from_secs(60),
            max_redirects: 5,
        }
    }
}

/// Transport contract consumed by the polling engine
///
/// Implementations must resolve every fetch exactly once, never both
/// succeeding and failing, and never neither.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issues a single shaped request and awaits its outcome
    async fn fetch(&self, request: RequestSpec) -> Result<PollResponse, TransportError>;
}

/// Transport implementation backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Builds a transport from process-wide configuration
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.idle_timeout)
            .redirect(Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client })
    }

    /// Wraps an already configured reqwest client
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, request: RequestSpec) -> Result<PollResponse, TransportError> {
        debug!("Fetching {}", request.url);

        let mut builder = self.client.get(request.url.clone());

        if let Some(credentials) = &request.basic_auth {
            builder = builder.basic_auth(&credentials.username, Some(&credentials.password));
        }

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;

        Ok(PollResponse {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = TransportConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(15));
        assert_eq!(config.idle_timeout, Duration::from_secs(60));
        assert_eq!(config.max_redirects, 5);
    }

    #[test]
    fn test_transport_builds_from_config() {
        assert!(HttpTransport::new(&TransportConfig::default()).is_ok());
    }
}
