//! Request shaping
//!
//! Turns entity configuration into concrete request descriptions: target
//! normalization, basic-auth attachment, and `Accept` header merging. The
//! rules here decide what goes on the wire for every backend variant.

use crate::error::RequestError;
use radiator_core::domain::entity::Credentials;
use reqwest::Url;

/// Header name used to carry the session token
pub const COOKIE_HEADER: &str = "Cookie";

/// Header name for content-type negotiation
pub const ACCEPT_HEADER: &str = "Accept";

/// A fully shaped GET request, ready for the transport
#[derive(Debug, Clone)]
pub struct RequestSpec {
    /// Resolved target URL
    pub url: Url,
    /// Basic-auth pair, attached only when present
    pub basic_auth: Option<Credentials>,
    /// Additional headers, in insertion order
    pub headers: Vec<(String, String)>,
}

impl RequestSpec {
    /// Creates a bare GET request for a URL
    pub fn get(url: Url) -> Self {
        Self {
            url,
            basic_auth: None,
            headers: Vec::new(),
        }
    }

    /// Attaches basic-auth credentials
    pub fn with_basic_auth(mut self, credentials: Credentials) -> Self {
        self.basic_auth = Some(credentials);
        self
    }

    /// Appends a header, keeping any headers already present
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Merges an `Accept` header when the entity declares a content type
    ///
    /// Passing `None` leaves the header set untouched.
    pub fn with_accept(self, accept: Option<&str>) -> Self {
        match accept {
            Some(value) => self.with_header(ACCEPT_HEADER, value),
            None => self,
        }
    }

    /// Looks up the first header with the given name
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Resolves a target string into a URL
///
/// A target without a scheme separator is interpreted as implicitly `http`.
/// Targets that still fail to parse are reported as malformed; the caller
/// skips the job rather than failing its workload.
pub fn normalize_target(target: &str) -> Result<Url, RequestError> {
    let candidate = if target.contains("://") {
        target.to_string()
    } else {
        format!("http://{target}")
    };

    Url::parse(&candidate).map_err(|_| RequestError::MalformedTarget {
        target: target.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scheme_is_defaulted_to_http() {
        let url = normalize_target("example.com/status").expect("valid target");
        assert_eq!(url.as_str(), "http://example.com/status");
    }

    #[test]
    fn test_explicit_scheme_is_preserved() {
        let url = normalize_target("https://ci.example.com/feed").expect("valid target");
        assert_eq!(url.as_str(), "https://ci.example.com/feed");
    }

    #[test]
    fn test_unparsable_target_is_malformed() {
        let err = normalize_target("http://[not-a-host").expect_err("must fail");
        assert!(matches!(
            err,
            RequestError::MalformedTarget { ref target } if target == "http://[not-a-host"
        ));
    }

    #[test]
    fn test_accept_merge_keeps_existing_headers() {
        let url = normalize_target("example.com/feed").expect("valid target");
        let spec = RequestSpec::get(url)
            .with_header(COOKIE_HEADER, "token=abc")
            .with_accept(Some("application/xml"));

        assert_eq!(spec.header(COOKIE_HEADER), Some("token=abc"));
        assert_eq!(spec.header(ACCEPT_HEADER), Some("application/xml"));
        assert_eq!(spec.headers.len(), 2);
    }

    #[test]
    fn test_accept_absent_adds_nothing() {
        let url = normalize_target("example.com/feed").expect("valid target");
        let spec = RequestSpec::get(url).with_accept(None);
        assert!(spec.headers.is_empty());
        assert!(spec.header(ACCEPT_HEADER).is_none());
    }
}
