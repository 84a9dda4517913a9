//! Error types for swaggerkit

use http::StatusCode;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use swaggerkit_openapi::SwaggerGenError;
use thiserror::Error;

/// Result type alias for swaggerkit operations
pub type Result<T, E = SwaggerError> = std::result::Result<T, E>;

/// Startup and serving errors
#[derive(Debug, Error)]
pub enum SwaggerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("OpenAPI generation failed: {0}")]
    Generator(#[from] SwaggerGenError),

    #[error("Invalid Swagger route '{path}': {message}")]
    Route { path: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Hyper(#[from] hyper::Error),

    #[error("Invalid listen address: {0}")]
    Addr(#[from] std::net::AddrParseError),
}

impl SwaggerError {
    pub(crate) fn route(path: impl Into<String>, err: impl fmt::Display) -> Self {
        Self::Route {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Configuration loading failures
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read settings file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Env(#[from] envy::Error),
}

/// HTTP error rendered as a JSON envelope
///
/// ```json
/// { "error": { "type": "not_found", "message": "Unknown document 'v3'" } }
/// ```
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub error_type: String,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, error_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status,
            error_type: error_type.into(),
            message: message.into(),
        }
    }

    /// Create a 404 Not Found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    /// Create a 500 Internal Server Error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error_type, self.message)
    }
}

impl std::error::Error for ApiError {}

/// JSON representation of API error response
#[derive(Serialize)]
pub(crate) struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Serialize)]
pub(crate) struct ErrorBody {
    #[serde(rename = "type")]
    pub error_type: String,
    pub message: String,
}

impl From<ApiError> for ErrorResponse {
    fn from(err: ApiError) -> Self {
        Self {
            error: ErrorBody {
                error_type: err.error_type,
                message: err.message,
            },
        }
    }
}

impl From<SwaggerGenError> for ApiError {
    fn from(err: SwaggerGenError) -> Self {
        match err {
            SwaggerGenError::UnknownDocument(name) => {
                ApiError::not_found(format!("Unknown Swagger document '{}'", name))
            }
            other => ApiError::internal(other.to_string()),
        }
    }
}
