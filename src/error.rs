use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Top-level error type for the entire application
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("Update error: {0}")]
    Update(#[from] UpdateError),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Login failures against the business API. Fatal to one tenant's batch,
/// never to the run.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("login request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("login rejected ({status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("login response carried no session cookie")]
    MissingSessionCookie,
}

/// Failures patching a single document. Fatal to that record only.
#[derive(Error, Debug)]
pub enum UpdateError {
    #[error("update request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("update rejected ({status}): {detail}")]
    Rejected { status: u16, detail: String },
}

/// API error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            AppError::Store(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORE_ERROR",
                "A store error occurred".to_string(),
            ),
            AppError::Config(detail) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "CONFIG_ERROR",
                format!("Configuration error: {}", detail),
            ),
            AppError::Auth(err) => (StatusCode::BAD_GATEWAY, "AUTH_ERROR", err.to_string()),
            AppError::Update(err) => (StatusCode::BAD_GATEWAY, "UPDATE_ERROR", err.to_string()),
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            error: message,
            error_code: error_code.to_string(),
        });

        (status, body).into_response()
    }
}

impl From<config::ConfigError> for AppError {
    fn from(error: config::ConfigError) -> Self {
        AppError::Config(error.to_string())
    }
}

/// Result type alias for the application
pub type AppResult<T> = Result<T, AppError>;
