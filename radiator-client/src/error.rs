//! Error types for the Radiator HTTP boundary

use thiserror::Error;

/// Request construction failures
///
/// Raised before anything goes on the wire; a malformed target never fails
/// the workload it belongs to, the job is skipped for the current pass.
#[derive(Debug, Error)]
pub enum RequestError {
    /// Target string could not be parsed into a URL
    #[error("malformed target URL: {target}")]
    MalformedTarget {
        /// The offending target string
        target: String,
    },
}

/// Transport-level failures
///
/// Any of these fails the entire workload for the current cycle.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection error or timeout from the HTTP client
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Backend answered with a non-success status
    #[error("backend returned status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, as far as it could be read
        message: String,
    },
}

/// Authentication exchange failures
#[derive(Debug, Error)]
pub enum AuthError {
    /// The authentication request itself failed
    #[error("authentication request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// The auth endpoint rejected the credentials
    #[error("authentication denied (status {status}): {message}")]
    Denied {
        /// HTTP status code
        status: u16,
        /// Response body from the auth endpoint
        message: String,
    },

    /// The auth endpoint answered but the token could not be extracted
    #[error("failed to parse authentication response: {0}")]
    ParseError(String),

    /// The entity is missing the configuration the exchange needs
    #[error("entity {0} is not configured for session authentication")]
    NotConfigured(String),
}

/// Workload-level polling failure
///
/// The error delivered to the workload handler when a cycle fails. Exactly
/// one of these reaches the handler per failed workload.
#[derive(Debug, Error)]
pub enum PollError {
    /// A job's request failed in transit
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The pre-flight authentication exchange failed
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// A job's target never became a valid URL
    #[error("malformed target URL: {target}")]
    MalformedTarget {
        /// The offending target string
        target: String,
    },

    /// The workload sat in the active set past the watchdog deadline
    #[error("workload stalled for {age_secs} s without completing")]
    Stalled {
        /// Age of the workload when it was expired
        age_secs: u64,
    },
}

impl From<RequestError> for PollError {
    fn from(err: RequestError) -> Self {
        match err {
            RequestError::MalformedTarget { target } => PollError::MalformedTarget { target },
        }
    }
}

impl PollError {
    /// Check if this failure came from the authentication exchange
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Check if this failure was raised by the watchdog
    pub fn is_stalled(&self) -> bool {
        matches!(self, Self::Stalled { .. })
    }
}
