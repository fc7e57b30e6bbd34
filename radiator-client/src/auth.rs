//! Session authentication
//!
//! Pre-flight authentication exchange for session-token backends. The
//! exchange yields a short-lived token consumed by exactly one fetch;
//! tokens are never cached or reused across polling cycles. Failures are
//! surfaced explicitly so the containing workload terminates
//! deterministically.

use crate::error::{AuthError, TransportError};
use crate::transport::TransportConfig;
use async_trait::async_trait;
use reqwest::redirect::Policy;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Ephemeral credential obtained from one authentication exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wraps a raw token string
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Authentication contract consumed by session-token strategies
///
/// Resolves exactly once per call: a token on success, a typed error on
/// failure. A failed exchange is routed into workload failure the same way
/// a transport error is.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Performs one authentication exchange against the given endpoint
    async fn authenticate(
        &self,
        auth_url: &str,
        username: &str,
        password: &str,
    ) -> Result<SessionToken, AuthError>;
}

/// Authenticator that POSTs credentials as JSON and expects a token back
#[derive(Debug, Clone)]
pub struct HttpAuthenticator {
    client: reqwest::Client,
}

impl HttpAuthenticator {
    /// Builds an authenticator sharing the process-wide transport limits
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .read_timeout(config.idle_timeout)
            .redirect(Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Authenticator for HttpAuthenticator {
    async fn authenticate(
        &self,
        auth_url: &str,
        username: &str,
        password: &str,
    ) -> Result<SessionToken, AuthError> {
        debug!("Authenticating against {}", auth_url);

        let response = self
            .client
            .post(auth_url)
            .json(&AuthRequest { username, password })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AuthError::Denied {
                status: status.as_u16(),
                message,
            });
        }

        let body: AuthResponse = response
            .json()
            .await
            .map_err(|e| AuthError::ParseError(format!("invalid token response: {e}")))?;

        Ok(SessionToken::new(body.token))
    }
}

#[derive(Debug, Serialize)]
struct AuthRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct AuthResponse {
    token: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let token = SessionToken::new("tok-123");
        assert_eq!(token.as_str(), "tok-123");
    }

    #[test]
    fn test_token_response_parses() {
        let body: AuthResponse =
            serde_json::from_str(r#"{"token": "tok-123"}"#).expect("valid response");
        assert_eq!(body.token, "tok-123");
    }
}
