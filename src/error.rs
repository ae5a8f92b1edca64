// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },

    // 401 Unauthorized
    Unauthorized(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError(String),
    ConfigurationError(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::NotFound(_) => 404,
            ApiError::InternalServerError(_) => 500,
            ApiError::ConfigurationError(_) => 500,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::Unauthorized(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ConfigurationError(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ConfigurationError(_) => "CONFIGURATION_ERROR",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::ValidationError {
                message,
                field_errors,
            } => {
                let mut response = json!({
                    "error": true,
                    "message": message,
                    "code": "VALIDATION_ERROR"
                });

                if let Some(field_errors) = field_errors {
                    response["field_errors"] = json!(field_errors);
                }

                response
            }
            _ => {
                json!({
                    "error": true,
                    "message": self.message(),
                    "code": self.error_code()
                })
            }
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn configuration_error(message: impl Into<String>) -> Self {
        ApiError::ConfigurationError(message.into())
    }
}

// Convert outbound service errors to ApiError. Upstream call failures are
// terminal for the current request and surface as 500 with a best-effort
// message; missing upstream records surface as 404.
impl From<crate::services::user_store::StoreError> for ApiError {
    fn from(err: crate::services::user_store::StoreError) -> Self {
        match err {
            crate::services::user_store::StoreError::NotFound => {
                ApiError::not_found("Not found in user store")
            }
            other => ApiError::internal_server_error(other.to_string()),
        }
    }
}

impl From<crate::services::clerk::ClerkError> for ApiError {
    fn from(err: crate::services::clerk::ClerkError) -> Self {
        match err {
            crate::services::clerk::ClerkError::Misconfigured(msg) => {
                ApiError::configuration_error(msg)
            }
            other => ApiError::internal_server_error(other.to_string()),
        }
    }
}

impl From<crate::services::google_oauth::GoogleOAuthError> for ApiError {
    fn from(err: crate::services::google_oauth::GoogleOAuthError) -> Self {
        match err {
            crate::services::google_oauth::GoogleOAuthError::Misconfigured(msg) => {
                ApiError::configuration_error(msg)
            }
            other => ApiError::internal_server_error(other.to_string()),
        }
    }
}

impl From<crate::services::spotify::SpotifyError> for ApiError {
    fn from(err: crate::services::spotify::SpotifyError) -> Self {
        match err {
            crate::services::spotify::SpotifyError::Misconfigured(msg) => {
                ApiError::configuration_error(msg)
            }
            other => ApiError::internal_server_error(other.to_string()),
        }
    }
}

impl From<crate::services::youtube::YouTubeError> for ApiError {
    fn from(err: crate::services::youtube::YouTubeError) -> Self {
        ApiError::internal_server_error(err.to_string())
    }
}

impl From<crate::services::openrouter::OpenRouterError> for ApiError {
    fn from(err: crate::services::openrouter::OpenRouterError) -> Self {
        match err {
            crate::services::openrouter::OpenRouterError::Misconfigured(msg) => {
                ApiError::configuration_error(msg)
            }
            other => ApiError::internal_server_error(other.to_string()),
        }
    }
}

impl From<crate::services::predictor::PredictorError> for ApiError {
    fn from(err: crate::services::predictor::PredictorError) -> Self {
        ApiError::internal_server_error(err.to_string())
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}
