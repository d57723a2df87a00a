use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    /// Bad email or password. One variant for both so responses never reveal
    /// whether the email exists.
    InvalidCredentials,
    AccountInactive,
    CompanyNotFound,
    CompanyAccessDenied,
    NoAccessibleCompany,
    InvalidRefreshToken,
    Unauthorized(String),
    Forbidden(String),
    BadRequest(String),
    RateLimited(String),
    /// Broken deployment, e.g. the built-in Administrator role is missing.
    Config(String),
    Internal(String),
    Database(sqlx::Error),
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AppError::InvalidCredentials => write!(f, "Invalid credentials"),
            AppError::AccountInactive => write!(f, "Account is deactivated"),
            AppError::CompanyNotFound => write!(f, "Company not found"),
            AppError::CompanyAccessDenied => write!(f, "You are not assigned to this company"),
            AppError::NoAccessibleCompany => write!(f, "No accessible company"),
            AppError::InvalidRefreshToken => write!(f, "Invalid refresh token"),
            AppError::Unauthorized(msg) => write!(f, "Unauthorized: {msg}"),
            AppError::Forbidden(msg) => write!(f, "Forbidden: {msg}"),
            AppError::BadRequest(msg) => write!(f, "Bad Request: {msg}"),
            AppError::RateLimited(msg) => write!(f, "Rate Limited: {msg}"),
            AppError::Config(msg) => write!(f, "Configuration Error: {msg}"),
            AppError::Internal(msg) => write!(f, "Internal Error: {msg}"),
            AppError::Database(err) => write!(f, "Database Error: {err}"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            AppError::AccountInactive => {
                (StatusCode::UNAUTHORIZED, "Account is deactivated".to_string())
            }
            AppError::CompanyNotFound => {
                (StatusCode::NOT_FOUND, "Company not found".to_string())
            }
            AppError::CompanyAccessDenied => (
                StatusCode::FORBIDDEN,
                "You are not assigned to this company".to_string(),
            ),
            AppError::NoAccessibleCompany => (
                StatusCode::FORBIDDEN,
                "No accessible company for this account".to_string(),
            ),
            AppError::InvalidRefreshToken => {
                (StatusCode::UNAUTHORIZED, "Invalid refresh token".to_string())
            }
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::RateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, msg.clone()),
            AppError::Config(msg) => {
                tracing::error!("Configuration error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {msg}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Database(err) => {
                tracing::error!("Database error: {err}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err)
    }
}
