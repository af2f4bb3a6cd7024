//! HTTP transport for forecast payloads
//!
//! The session only needs "GET this URL with these headers, give me the
//! body", so the transport is a trait. `HttpTransport` is the blocking
//! `reqwest` implementation; tests substitute their own.

use std::time::Duration;

use reqwest::blocking::Client;
use thiserror::Error;

/// Request timeout for forecast downloads
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Errors that can occur when downloading a payload
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransportError {
    /// HTTP request failed before a response arrived
    #[error("HTTP request failed: {0}")]
    RequestFailed(String),

    /// Server answered with a non-success status
    #[error("HTTP request returned status {0}")]
    Status(u16),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        TransportError::RequestFailed(e.to_string())
    }
}

/// Fetches raw response bodies
pub trait Transport {
    fn fetch(&self, url: &str, headers: &[(&str, String)]) -> Result<Vec<u8>, TransportError>;
}

/// Blocking HTTP transport backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    /// Create a transport with the default timeout
    pub fn new() -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        Ok(Self { client })
    }

    /// Create a transport with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for HttpTransport {
    fn fetch(&self, url: &str, headers: &[(&str, String)]) -> Result<Vec<u8>, TransportError> {
        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, value.as_str());
        }

        tracing::info!("Fetching forecast from {}", url);
        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()));
        }

        Ok(response.bytes()?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_message() {
        assert_eq!(
            TransportError::Status(403).to_string(),
            "HTTP request returned status 403"
        );
    }

    #[test]
    fn test_unreachable_host_is_request_failure() {
        let transport = HttpTransport::new().expect("Client should build");
        // Port 9 on localhost is the discard service and is normally closed
        let result = transport.fetch("http://127.0.0.1:9/forecast", &[]);

        assert!(matches!(result, Err(TransportError::RequestFailed(_))));
    }
}
