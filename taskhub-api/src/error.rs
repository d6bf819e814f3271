/// Error handling for the API server
///
/// A unified error type that maps to the HTTP contract: handlers return
/// `Result<T, ApiError>` and conversion to a response happens in one
/// place.
///
/// Response bodies follow the surface contract exactly:
/// - 422 carries `{"error": "<message>"}` with enough detail to diagnose
///   the offending field
/// - 401, 404, and 500 carry empty bodies; authentication and ownership
///   failures are deliberately opaque
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use taskhub_shared::auth::{jwt::JwtError, password::PasswordError, session::AuthError};

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Bad, missing, or disallowed fields (422 with detail)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Missing, invalid, or revoked credentials (401, empty body)
    #[error("Unauthenticated")]
    Unauthenticated,

    /// Resource absent or owned by someone else (404, empty body)
    #[error("Not found")]
    NotFound,

    /// Unexpected persistence or infrastructure failure (500, empty body)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Validation(message) => {
                (StatusCode::UNPROCESSABLE_ENTITY, Json(json!({ "error": message }))).into_response()
            }
            ApiError::Unauthenticated => StatusCode::UNAUTHORIZED.into_response(),
            ApiError::NotFound => StatusCode::NOT_FOUND.into_response(),
            ApiError::Internal(message) => {
                // Log the detail, never expose it to the client
                tracing::error!("Internal error: {}", message);
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
        }
    }
}

/// Convert sqlx errors to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::NotFound,
            sqlx::Error::Database(db_err) => {
                // The unique index on users.email surfaces as a constraint
                // violation; report it as a validation failure
                if let Some(constraint) = db_err.constraint() {
                    if constraint.contains("email") {
                        return ApiError::Validation("email already in use".to_string());
                    }
                }
                ApiError::Internal(format!("Database error: {}", db_err))
            }
            _ => ApiError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// Convert auth errors to API errors
///
/// Credential and token failures collapse to 401; only infrastructure
/// failures become 500.
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials | AuthError::Unauthenticated => {
                ApiError::Unauthenticated
            }
            AuthError::Token(e) => ApiError::Internal(format!("Token error: {}", e)),
            AuthError::Password(e) => ApiError::Internal(format!("Password error: {}", e)),
            AuthError::Database(e) => ApiError::from(e),
        }
    }
}

/// Convert password hashing errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::Internal(format!("Password operation failed: {}", err))
    }
}

/// Convert token signing errors to API errors
impl From<JwtError> for ApiError {
    fn from(err: JwtError) -> Self {
        ApiError::Internal(format!("Token operation failed: {}", err))
    }
}
