//! Wire types exchanged between the caller and the relay
//!
//! The caller submits a `RequestDescriptor`; the relay answers with exactly
//! one `TerminalPayload` per request that was not superseded. Payloads are
//! serde-serializable because the real channel boundary serializes them.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::utils::RelayError;

/// Structured request options: method, target URL and transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestConfig {
    /// HTTP method; GET when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// Target URL
    pub url: String,
}

/// Request options: either a bare URL string or a structured config
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestOptions {
    Url(String),
    Config(RequestConfig),
}

impl RequestOptions {
    /// Get the target URL
    pub fn url(&self) -> &str {
        match self {
            Self::Url(url) => url,
            Self::Config(config) => &config.url,
        }
    }

    /// Get the HTTP method, defaulting to GET
    pub fn method(&self) -> &str {
        match self {
            Self::Url(_) => "GET",
            Self::Config(config) => config.method.as_deref().unwrap_or("GET"),
        }
    }
}

/// Outgoing request payload: text or raw bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestBody {
    Text(String),
    Binary(Vec<u8>),
}

impl RequestBody {
    /// Consume the body as raw bytes
    pub fn into_bytes(self) -> Vec<u8> {
        match self {
            Self::Text(text) => text.into_bytes(),
            Self::Binary(bytes) => bytes,
        }
    }

    /// Check whether there is any payload to write
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Binary(bytes) => bytes.is_empty(),
        }
    }
}

impl Default for RequestBody {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

/// A request submitted by the caller; immutable once submitted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub options: RequestOptions,
    #[serde(default)]
    pub headers: HashMap<String, String>,
    #[serde(default)]
    pub body: RequestBody,
}

impl RequestDescriptor {
    /// Create a GET descriptor for a bare URL
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            options: RequestOptions::Url(url.into()),
            headers: HashMap::new(),
            body: RequestBody::default(),
        }
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set the outgoing payload
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }
}

/// Serialized description of a transport failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorInfo {
    pub message: String,
}

impl ErrorInfo {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for ErrorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<RelayError> for ErrorInfo {
    fn from(err: RelayError) -> Self {
        Self::new(err.to_string())
    }
}

/// The one message that ends a request's observable lifecycle
///
/// Tagged by `kind` on the wire so callers discriminate success from failure
/// without shape-sniffing. `request_id` correlates the payload with its
/// submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TerminalPayload {
    Success { request_id: u64, body: String },
    Failure { request_id: u64, error: ErrorInfo },
}

impl TerminalPayload {
    /// Create a success payload
    pub fn success(request_id: u64, body: impl Into<String>) -> Self {
        Self::Success {
            request_id,
            body: body.into(),
        }
    }

    /// Create a failure payload
    pub fn failure(request_id: u64, error: ErrorInfo) -> Self {
        Self::Failure { request_id, error }
    }

    /// Get the id of the submission this payload answers
    pub fn request_id(&self) -> u64 {
        match self {
            Self::Success { request_id, .. } | Self::Failure { request_id, .. } => *request_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_bare_url() {
        let options: RequestOptions = serde_json::from_str(r#""https://example.com/a""#).unwrap();
        assert_eq!(options, RequestOptions::Url("https://example.com/a".to_string()));
        assert_eq!(options.url(), "https://example.com/a");
        assert_eq!(options.method(), "GET");
    }

    #[test]
    fn test_options_structured() {
        let options: RequestOptions =
            serde_json::from_str(r#"{"method":"POST","url":"https://example.com/a"}"#).unwrap();
        assert_eq!(options.method(), "POST");
        assert_eq!(options.url(), "https://example.com/a");
    }

    #[test]
    fn test_descriptor_defaults() {
        let descriptor: RequestDescriptor =
            serde_json::from_str(r#"{"options":"https://example.com"}"#).unwrap();
        assert!(descriptor.headers.is_empty());
        assert!(descriptor.body.is_empty());
    }

    #[test]
    fn test_descriptor_builder() {
        let descriptor = RequestDescriptor::get("https://example.com")
            .header("Authorization", "Bearer t")
            .body(RequestBody::Text("payload".to_string()));
        assert_eq!(
            descriptor.headers.get("Authorization"),
            Some(&"Bearer t".to_string())
        );
        assert_eq!(descriptor.body.into_bytes(), b"payload");
    }

    #[test]
    fn test_terminal_payload_tagged_success() {
        let payload = TerminalPayload::success(7, "Hello");
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], "success");
        assert_eq!(json["request_id"], 7);
        assert_eq!(json["body"], "Hello");
    }

    #[test]
    fn test_terminal_payload_tagged_failure() {
        let payload = TerminalPayload::failure(3, ErrorInfo::new("connection reset"));
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], "failure");
        assert_eq!(json["error"]["message"], "connection reset");

        let back: TerminalPayload = serde_json::from_value(json).unwrap();
        assert_eq!(back.request_id(), 3);
    }

    #[test]
    fn test_body_untagged() {
        let body: RequestBody = serde_json::from_str(r#""hello""#).unwrap();
        assert_eq!(body, RequestBody::Text("hello".to_string()));

        let body: RequestBody = serde_json::from_str("[104,105]").unwrap();
        assert_eq!(body, RequestBody::Binary(vec![104, 105]));
    }
}
