//! Network primitive performing one HTTP request
//!
//! Exposes the response body as ordered `FetchEvent` chunks plus an error
//! channel. The `Fetch` trait is the seam between the relay and the real
//! network so the single-flight logic can be exercised without sockets.

use bytes::Bytes;
use futures::StreamExt;
use reqwest::header::{HeaderName, HeaderValue};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;

use crate::channel::{ErrorInfo, RequestDescriptor};
use crate::utils::{RelayError, Result};

/// Events delivered by a network operation, in delivery order
#[derive(Debug, Clone)]
pub enum FetchEvent {
    /// One chunk of the response body
    Chunk(Bytes),
    /// The body stream ended; no further events follow
    Completed,
    /// Connection or protocol failure; no further events follow
    Failed(ErrorInfo),
}

/// A network primitive that performs one HTTP request
///
/// `start` is fire-and-forget: implementations deliver `FetchEvent`s on
/// `events` in order, ending with `Completed` or `Failed`, and must stop
/// promptly once `cancel` fires. Descriptor validation is the primitive's
/// job; the relay submits descriptors as-is.
pub trait Fetch: Send + Sync {
    fn start(
        &self,
        descriptor: RequestDescriptor,
        events: UnboundedSender<FetchEvent>,
        cancel: CancellationToken,
    );
}

/// Production fetcher backed by reqwest
///
/// No request timeout is configured: a request that never completes holds
/// the relay's single slot until it is superseded (known limitation of the
/// single-flight contract).
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Create a new fetcher with a shared connection pool
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(concat!("NetRelay/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Fetch for HttpFetcher {
    fn start(
        &self,
        descriptor: RequestDescriptor,
        events: UnboundedSender<FetchEvent>,
        cancel: CancellationToken,
    ) {
        let client = self.client.clone();
        let url = descriptor.options.url().to_string();

        tokio::spawn(async move {
            let terminal = events.clone();
            tokio::select! {
                // Dropping the request future aborts the connection.
                _ = cancel.cancelled() => {
                    log::debug!("fetch aborted: {}", url);
                }
                result = run_request(client, descriptor, events) => {
                    if let Err(err) = result {
                        log::debug!("fetch failed: {}: {}", url, err);
                        let _ = terminal.send(FetchEvent::Failed(ErrorInfo::from(err)));
                    }
                }
            }
        });
    }
}

/// Send the request and pump body chunks to the relay in delivery order
async fn run_request(
    client: reqwest::Client,
    descriptor: RequestDescriptor,
    events: UnboundedSender<FetchEvent>,
) -> Result<()> {
    let request = build_request(&client, descriptor)?;
    let response = client.execute(request).await?;
    log::debug!("response {} from {}", response.status(), response.url());

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        if events.send(FetchEvent::Chunk(chunk?)).is_err() {
            // Receiver superseded; stop reading the body.
            return Ok(());
        }
    }

    let _ = events.send(FetchEvent::Completed);
    Ok(())
}

/// Build the outgoing request: method and URL, then each header pair one at
/// a time, then the body, then finalize
pub(crate) fn build_request(
    client: &reqwest::Client,
    descriptor: RequestDescriptor,
) -> Result<reqwest::Request> {
    let method = descriptor.options.method().to_uppercase();
    let method = reqwest::Method::from_bytes(method.as_bytes())
        .map_err(|_| RelayError::InvalidMethod(method.clone()))?;
    let url = reqwest::Url::parse(descriptor.options.url())
        .map_err(|e| RelayError::InvalidUrl(format!("{}: {}", descriptor.options.url(), e)))?;

    let mut builder = client.request(method, url);
    for (name, value) in &descriptor.headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| RelayError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        let header_value =
            HeaderValue::from_str(value).map_err(|e| RelayError::InvalidHeader {
                name: name.clone(),
                reason: e.to_string(),
            })?;
        builder = builder.header(header_name, header_value);
    }

    if !descriptor.body.is_empty() {
        builder = builder.body(descriptor.body.into_bytes());
    }

    builder.build().map_err(RelayError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel::{RequestBody, RequestConfig, RequestOptions};

    fn client() -> reqwest::Client {
        reqwest::Client::new()
    }

    #[test]
    fn test_build_bare_url_is_get() {
        let descriptor = RequestDescriptor::get("https://example.com/a");
        let request = build_request(&client(), descriptor).unwrap();
        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(request.url().as_str(), "https://example.com/a");
        assert!(request.body().is_none());
    }

    #[test]
    fn test_build_structured_method_normalized() {
        let descriptor = RequestDescriptor {
            options: RequestOptions::Config(RequestConfig {
                method: Some("post".to_string()),
                url: "https://example.com/submit".to_string(),
            }),
            headers: Default::default(),
            body: RequestBody::default(),
        };
        let request = build_request(&client(), descriptor).unwrap();
        assert_eq!(request.method(), reqwest::Method::POST);
    }

    #[test]
    fn test_headers_attached_before_finalize() {
        let descriptor = RequestDescriptor::get("https://example.com")
            .header("Authorization", "Bearer t")
            .body(RequestBody::Text("payload".to_string()));
        let request = build_request(&client(), descriptor).unwrap();

        // The finalized request carries both the header and the body.
        assert_eq!(
            request.headers().get("Authorization").unwrap(),
            &HeaderValue::from_static("Bearer t")
        );
        assert_eq!(request.body().unwrap().as_bytes().unwrap(), b"payload");
    }

    #[test]
    fn test_binary_body_attached() {
        let descriptor = RequestDescriptor::get("https://example.com")
            .body(RequestBody::Binary(vec![0, 159, 146, 150]));
        let request = build_request(&client(), descriptor).unwrap();
        assert_eq!(
            request.body().unwrap().as_bytes().unwrap(),
            &[0, 159, 146, 150]
        );
    }

    #[test]
    fn test_empty_body_not_attached() {
        let descriptor = RequestDescriptor::get("https://example.com");
        let request = build_request(&client(), descriptor).unwrap();
        assert!(request.body().is_none());
    }

    #[test]
    fn test_invalid_url_rejected() {
        let descriptor = RequestDescriptor::get("not a url");
        let err = build_request(&client(), descriptor).unwrap_err();
        assert!(matches!(err, RelayError::InvalidUrl(_)));
    }

    #[test]
    fn test_invalid_method_rejected() {
        let descriptor = RequestDescriptor {
            options: RequestOptions::Config(RequestConfig {
                method: Some("GE T".to_string()),
                url: "https://example.com".to_string(),
            }),
            headers: Default::default(),
            body: RequestBody::default(),
        };
        let err = build_request(&client(), descriptor).unwrap_err();
        assert!(matches!(err, RelayError::InvalidMethod(_)));
    }

    #[test]
    fn test_invalid_header_rejected() {
        let descriptor =
            RequestDescriptor::get("https://example.com").header("X-Bad", "line\nbreak");
        let err = build_request(&client(), descriptor).unwrap_err();
        assert!(matches!(err, RelayError::InvalidHeader { .. }));
    }
}
