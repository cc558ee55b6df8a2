//! Generic HTTP fetching with error handling

use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, error, instrument};

use crate::error::AppError;

/// Fetches a URL and deserializes the JSON body.
///
/// Transport failures, non-success statuses, and malformed bodies all map to
/// distinct [`AppError`] variants so callers can tell "the race does not
/// exist" apart from "the API is down".
#[instrument(skip(client))]
pub(super) async fn fetch<T: DeserializeOwned>(client: &Client, url: &str) -> Result<T, AppError> {
    debug!("Fetching data from URL: {url}");

    let response = match client.get(url).send().await {
        Ok(resp) => resp,
        Err(e) => {
            error!("Request failed for URL {}: {}", url, e);
            return if e.is_timeout() {
                Err(AppError::network_timeout(url))
            } else if e.is_connect() {
                Err(AppError::network_connection(url, e.to_string()))
            } else {
                Err(AppError::ApiFetch(e))
            };
        }
    };

    let status = response.status();
    debug!("Response status: {status}");

    if !status.is_success() {
        let status_code = status.as_u16();
        let reason = status.canonical_reason().unwrap_or("Unknown error");

        error!("HTTP {} - {} (URL: {})", status_code, reason, url);

        return Err(match status_code {
            404 => AppError::api_not_found(url),
            400..=499 => AppError::api_client_error(status_code, reason, url),
            _ => AppError::api_server_error(status_code, reason, url),
        });
    }

    let response_text = match response.text().await {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to read response body from URL {}: {}", url, e);
            return Err(AppError::ApiFetch(e));
        }
    };

    debug!("Response length: {} bytes", response_text.len());

    if response_text.trim().is_empty() {
        return Err(AppError::api_malformed_json("empty response body", url));
    }

    match serde_json::from_str::<T>(&response_text) {
        Ok(parsed) => Ok(parsed),
        Err(e) if e.is_data() => {
            error!("Unexpected JSON structure from URL {}: {}", url, e);
            Err(AppError::api_unexpected_structure(e.to_string(), url))
        }
        Err(e) => {
            error!("Malformed JSON from URL {}: {}", url, e);
            Err(AppError::api_malformed_json(e.to_string(), url))
        }
    }
}
