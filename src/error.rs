//! Custom error types for blockchart
//!
//! Validation errors stop the run before anything is fetched. Everything
//! raised afterwards is collapsed into the no-data state by the pipeline,
//! but keeps its specific variant here for logging and tests.

use thiserror::Error;

/// Main error type for the blockchart application
#[derive(Error, Debug)]
pub enum BlockchartError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// ActivityWatch API errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Parameter validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDirectory,

    #[error("Failed to load configuration file: {0}")]
    LoadFailed(String),

    #[error("Failed to save configuration file: {0}")]
    SaveFailed(String),

    #[error("Invalid server URL: {0}")]
    InvalidServerUrl(String),
}

/// ActivityWatch API errors
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request to {url} failed with status {status}: {body}")]
    RequestFailed {
        url: String,
        status: u16,
        body: String,
    },

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),
}

/// Parameter validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Missing required parameters: {}", .0.join(", "))]
    MissingParameter(Vec<String>),

    #[error("Invalid timestamp for {field}: {value}. Expected an ISO-8601 date-time or YYYY-MM-DD")]
    InvalidTimestamp { field: String, value: String },

    #[error("Time range is empty: start {start} is not before end {end}")]
    EmptyRange { start: String, end: String },

    #[error("Invalid visualization URL: {0}")]
    InvalidUrl(String),
}

/// Result type alias for blockchart
pub type Result<T> = std::result::Result<T, BlockchartError>;

impl From<reqwest::Error> for BlockchartError {
    fn from(err: reqwest::Error) -> Self {
        BlockchartError::Api(ApiError::NetworkError(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BlockchartError::Validation(ValidationError::MissingParameter(vec![
            "hostname".to_string(),
            "end".to_string(),
        ]));
        assert_eq!(
            err.to_string(),
            "Validation error: Missing required parameters: hostname, end"
        );

        let err = BlockchartError::Api(ApiError::RequestFailed {
            url: "http://localhost:5600/api/0/query/".to_string(),
            status: 500,
            body: "boom".to_string(),
        });
        assert!(err.to_string().contains("status 500"));
    }

    #[test]
    fn test_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: BlockchartError = json_err.into();
        assert!(matches!(err, BlockchartError::Json(_)));
        assert!(err.to_string().starts_with("JSON error: "));
    }

    #[test]
    fn test_validation_classification() {
        let err: BlockchartError = ValidationError::InvalidTimestamp {
            field: "start".to_string(),
            value: "yesterday".to_string(),
        }
        .into();
        assert!(matches!(err, BlockchartError::Validation(_)));
        assert!(err.to_string().contains("Invalid timestamp for start"));
    }
}
