//! Mock HTTP client shared by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use super::error::FetchError;
use super::http::HttpClient;

/// Routes exact URLs to canned responses and records every request.
///
/// Unknown URLs answer with `NotFound`.
#[derive(Default)]
pub struct MockHttpClient {
    routes: HashMap<String, Vec<Result<Vec<u8>, FetchError>>>,
    requests: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Respond to `url` with a body.
    pub fn with_body(self, url: &str, body: impl Into<Vec<u8>>) -> Self {
        self.with_response(url, Ok(body.into()))
    }

    /// Respond to `url` with a status-mapped error.
    pub fn with_status(self, url: &str, status: u16) -> Self {
        self.with_response(url, Err(FetchError::from_status(url, status)))
    }

    /// Queue a response for `url`. Queued responses are served in order and
    /// the last one repeats.
    pub fn with_response(mut self, url: &str, response: Result<Vec<u8>, FetchError>) -> Self {
        self.routes.entry(url.to_string()).or_default().push(response);
        self
    }

    /// URLs requested so far, in order.
    pub fn requested_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|(url, _)| url.clone())
            .collect()
    }

    /// Headers sent with the most recent request to `url`.
    pub fn headers_for(&self, url: &str) -> Option<Vec<(String, String)>> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .rev()
            .find(|(u, _)| u == url)
            .map(|(_, headers)| headers.clone())
    }
}

impl HttpClient for MockHttpClient {
    fn get(&self, url: &str, headers: &[(&str, &str)]) -> Result<Vec<u8>, FetchError> {
        let mut requests = self.requests.lock().unwrap();
        let previous = requests.iter().filter(|(u, _)| u == url).count();
        requests.push((
            url.to_string(),
            headers
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        ));

        match self.routes.get(url) {
            Some(responses) => responses[previous.min(responses.len() - 1)].clone(),
            None => Err(FetchError::NotFound {
                url: url.to_string(),
            }),
        }
    }
}
