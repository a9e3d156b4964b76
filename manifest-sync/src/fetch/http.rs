//! HTTP client abstraction for testability

use std::time::Duration;

use tracing::debug;

use super::error::FetchError;

/// Default per-request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 20;

/// User agent sent with every request; the content API rejects requests without one.
pub const USER_AGENT: &str = concat!("manifest-sync/", env!("CARGO_PKG_VERSION"));

/// Trait for HTTP client operations.
///
/// This abstraction allows for dependency injection and easier testing
/// by enabling mock HTTP clients in tests.
pub trait HttpClient: Send + Sync {
    /// Performs an HTTP GET request.
    ///
    /// # Arguments
    ///
    /// * `url` - The URL to request
    /// * `headers` - Extra request headers
    ///
    /// # Returns
    ///
    /// The response body for a 2xx status. Other statuses are mapped with
    /// [`FetchError::from_status`].
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<Vec<u8>, FetchError>;
}

/// Real HTTP client implementation using reqwest.
pub struct ReqwestClient {
    client: reqwest::blocking::Client,
    timeout: Duration,
}

impl ReqwestClient {
    /// Creates a new ReqwestClient with the default timeout.
    pub fn new() -> Result<Self, FetchError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a new ReqwestClient with custom timeout.
    pub fn with_timeout(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Network {
                url: String::new(),
                reason: format!("failed to create HTTP client: {}", e),
            })?;

        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl HttpClient for ReqwestClient {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<Vec<u8>, FetchError> {
        debug!(url, "GET");

        let mut request = self.client.get(url);
        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                    timeout_secs: self.timeout.as_secs(),
                }
            } else {
                FetchError::Network {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        // Check HTTP status
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::from_status(url, status.as_u16()));
        }

        // Read response body
        response.bytes().map(|b| b.to_vec()).map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                    timeout_secs: self.timeout.as_secs(),
                }
            } else {
                FetchError::Network {
                    url: url.to_string(),
                    reason: format!("failed to read response: {}", e),
                }
            }
        })
    }
}
