//! HTTP client creation and configuration

use reqwest::Client;
use std::time::Duration;

use crate::constants::{API_BASE_URL, DEFAULT_HTTP_TIMEOUT_SECONDS, HTTP_POOL_MAX_IDLE_PER_HOST};
use crate::error::AppError;

/// Handle to the results API: a pooled HTTP client plus the base URL every
/// endpoint builds on. Tests point the base URL at a mock server.
#[derive(Debug, Clone)]
pub struct ApiClient {
    pub(super) client: Client,
    pub(super) base_url: String,
}

impl ApiClient {
    /// Creates a client against the production API.
    pub fn new() -> Result<Self, AppError> {
        Self::with_base_url(API_BASE_URL)
    }

    /// Creates a client against an arbitrary base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECONDS))
            .pool_max_idle_per_host(HTTP_POOL_MAX_IDLE_PER_HOST)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_uses_production_base_url() {
        let client = ApiClient::new().unwrap();
        assert_eq!(client.base_url(), API_BASE_URL);
    }

    #[test]
    fn test_with_base_url_override() {
        let client = ApiClient::with_base_url("http://127.0.0.1:8080").unwrap();
        assert_eq!(client.base_url(), "http://127.0.0.1:8080");
    }
}
