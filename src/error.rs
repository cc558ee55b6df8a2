use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Usage(String),

    #[error("Failed to fetch data from API: {0}")]
    ApiFetch(#[from] reqwest::Error),

    #[error("Failed to parse API response: {0}")]
    ApiParse(#[from] serde_json::Error),

    // Specific HTTP status code errors
    #[error("API request not found (404): {url}")]
    ApiNotFound { url: String },

    #[error("API server error ({status}): {message} (URL: {url})")]
    ApiServerError {
        status: u16,
        message: String,
        url: String,
    },

    #[error("API client error ({status}): {message} (URL: {url})")]
    ApiClientError {
        status: u16,
        message: String,
        url: String,
    },

    // Network-specific errors
    #[error("Network timeout while fetching data from: {url}")]
    NetworkTimeout { url: String },

    #[error("Connection failed to: {url} - {message}")]
    NetworkConnection { url: String, message: String },

    // Data parsing and validation errors
    #[error("API returned malformed JSON: {message} (URL: {url})")]
    ApiMalformedJson { message: String, url: String },

    #[error("API returned unexpected data structure: {message} (URL: {url})")]
    ApiUnexpectedStructure { message: String, url: String },

    // Empty result sets for otherwise well-formed queries
    #[error("{0}")]
    NoResults(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Create a usage error (bad flag/argument combinations)
    pub fn usage(msg: impl Into<String>) -> Self {
        Self::Usage(msg.into())
    }

    /// Create an API not found error
    pub fn api_not_found(url: impl Into<String>) -> Self {
        Self::ApiNotFound { url: url.into() }
    }

    /// Create an API server error (5xx status codes)
    pub fn api_server_error(
        status: u16,
        message: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self::ApiServerError {
            status,
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create an API client error (4xx status codes except 404)
    pub fn api_client_error(
        status: u16,
        message: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self::ApiClientError {
            status,
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create a network timeout error
    pub fn network_timeout(url: impl Into<String>) -> Self {
        Self::NetworkTimeout { url: url.into() }
    }

    /// Create a network connection error
    pub fn network_connection(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NetworkConnection {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a malformed JSON error
    pub fn api_malformed_json(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::ApiMalformedJson {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create an unexpected data structure error
    pub fn api_unexpected_structure(message: impl Into<String>, url: impl Into<String>) -> Self {
        Self::ApiUnexpectedStructure {
            message: message.into(),
            url: url.into(),
        }
    }

    /// Create an empty-result-set error
    pub fn no_results(msg: impl Into<String>) -> Self {
        Self::NoResults(msg.into())
    }

    /// Check if error indicates data not found (business logic, not technical failure)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            AppError::ApiNotFound { .. } | AppError::NoResults(_)
        )
    }

    /// Process exit code for this error: 2 for usage problems, 1 otherwise.
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Usage(_) => 2,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_error_helper() {
        let error = AppError::usage("use only one of --race or --event");
        assert!(matches!(error, AppError::Usage(_)));
        assert_eq!(error.to_string(), "use only one of --race or --event");
        assert_eq!(error.exit_code(), 2);
    }

    #[test]
    fn test_api_not_found_helper() {
        let error = AppError::api_not_found("https://api.example.com/Results?RaceId=XX");
        assert!(matches!(error, AppError::ApiNotFound { .. }));
        assert_eq!(
            error.to_string(),
            "API request not found (404): https://api.example.com/Results?RaceId=XX"
        );
        assert!(error.is_not_found());
    }

    #[test]
    fn test_api_server_error_helper() {
        let error =
            AppError::api_server_error(500, "Internal server error", "https://api.example.com");
        assert!(matches!(error, AppError::ApiServerError { .. }));
        assert_eq!(
            error.to_string(),
            "API server error (500): Internal server error (URL: https://api.example.com)"
        );
    }

    #[test]
    fn test_api_client_error_helper() {
        let error = AppError::api_client_error(400, "Bad request", "https://api.example.com");
        assert!(matches!(error, AppError::ApiClientError { .. }));
        assert_eq!(
            error.to_string(),
            "API client error (400): Bad request (URL: https://api.example.com)"
        );
    }

    #[test]
    fn test_network_timeout_helper() {
        let error = AppError::network_timeout("https://api.example.com");
        assert!(matches!(error, AppError::NetworkTimeout { .. }));
        assert_eq!(
            error.to_string(),
            "Network timeout while fetching data from: https://api.example.com"
        );
    }

    #[test]
    fn test_network_connection_helper() {
        let error = AppError::network_connection("https://api.example.com", "Connection refused");
        assert!(matches!(error, AppError::NetworkConnection { .. }));
        assert_eq!(
            error.to_string(),
            "Connection failed to: https://api.example.com - Connection refused"
        );
    }

    #[test]
    fn test_api_malformed_json_helper() {
        let error =
            AppError::api_malformed_json("Response is not valid JSON", "https://api.example.com");
        assert!(matches!(error, AppError::ApiMalformedJson { .. }));
        assert_eq!(
            error.to_string(),
            "API returned malformed JSON: Response is not valid JSON (URL: https://api.example.com)"
        );
    }

    #[test]
    fn test_api_unexpected_structure_helper() {
        let error =
            AppError::api_unexpected_structure("missing field `SeasonId`", "https://api.example.com");
        assert!(matches!(error, AppError::ApiUnexpectedStructure { .. }));
        assert_eq!(
            error.to_string(),
            "API returned unexpected data structure: missing field `SeasonId` (URL: https://api.example.com)"
        );
    }

    #[test]
    fn test_is_not_found() {
        assert!(AppError::api_not_found("url").is_not_found());
        assert!(AppError::no_results("no results found for race X").is_not_found());

        assert!(!AppError::api_server_error(500, "message", "url").is_not_found());
        assert!(!AppError::network_timeout("url").is_not_found());
        assert!(!AppError::usage("message").is_not_found());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(AppError::usage("bad flags").exit_code(), 2);
        assert_eq!(AppError::no_results("empty").exit_code(), 1);
        assert_eq!(AppError::network_timeout("url").exit_code(), 1);
        assert_eq!(
            AppError::api_server_error(500, "oops", "url").exit_code(),
            1
        );
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let app_error: AppError = json_error.into();
        assert!(matches!(app_error, AppError::ApiParse(_)));
    }

    #[test]
    fn test_error_from_io() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let app_error: AppError = io_error.into();
        assert!(matches!(app_error, AppError::Io(_)));
    }

    #[test]
    fn test_error_display_formats() {
        let errors = vec![
            AppError::usage("test usage error"),
            AppError::api_not_found("https://example.com"),
            AppError::api_server_error(500, "server error", "https://example.com"),
            AppError::api_client_error(400, "client error", "https://example.com"),
            AppError::network_timeout("https://example.com"),
            AppError::network_connection("https://example.com", "connection failed"),
            AppError::api_malformed_json("bad json", "https://example.com"),
            AppError::api_unexpected_structure("bad structure", "https://example.com"),
            AppError::no_results("no results"),
        ];

        for error in errors {
            let display_string = error.to_string();
            assert!(
                !display_string.is_empty(),
                "Error display should not be empty: {error:?}"
            );
        }
    }
}
