use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// The application's error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// A database error.
    #[error("Database error: {0}")]
    Database(#[from] tokio_postgres::Error),

    /// A connection pool error.
    #[error("Pool error: {0}")]
    Pool(#[from] deadpool_postgres::PoolError),

    /// A connection pool construction error.
    #[error("Pool creation error: {0}")]
    CreatePool(#[from] deadpool_postgres::CreatePoolError),

    /// A required request field is missing or malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unknown email or wrong password. The two cases are indistinguishable.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// No bearer token was presented.
    #[error("No token provided")]
    MissingToken,

    /// The token is malformed, wrongly signed or expired.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// The token is valid but its user no longer exists.
    #[error("User not found")]
    UserNotFound,

    /// The route exists but not for this method.
    #[error("Method not allowed")]
    MethodNotAllowed,

    /// An internal server error.
    #[error("Internal server error: {0}")]
    Internal(String),
}

/// A `Result` type that uses `AppError` as the error type.
pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    /// The status code and client-facing message for this error.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            AppError::Database(_)
            | AppError::Pool(_)
            | AppError::CreatePool(_)
            | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::InvalidCredentials => {
                (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string())
            }
            AppError::MissingToken => (StatusCode::UNAUTHORIZED, "No token provided".to_string()),
            AppError::InvalidToken(_) => (StatusCode::UNAUTHORIZED, "Invalid token".to_string()),
            AppError::UserNotFound => (StatusCode::UNAUTHORIZED, "User not found".to_string()),
            AppError::MethodNotAllowed => (
                StatusCode::METHOD_NOT_ALLOWED,
                "Method not allowed".to_string(),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Database(e) => tracing::error!("Database error: {}", e),
            AppError::Pool(e) => tracing::error!("Pool error: {}", e),
            AppError::CreatePool(e) => tracing::error!("Pool creation error: {}", e),
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            AppError::Validation(msg) => tracing::debug!("Validation error: {}", msg),
            AppError::InvalidToken(reason) => tracing::warn!("Token rejected: {}", reason),
            AppError::InvalidCredentials | AppError::MissingToken | AppError::UserNotFound => {
                tracing::warn!("Authentication failed: {}", self)
            }
            AppError::MethodNotAllowed => tracing::debug!("Method not allowed"),
        }

        let (status, message) = self.status_and_message();

        let body = sonic_rs::to_string(&sonic_rs::json!({
            "message": message
        }))
        .unwrap_or_else(|_| r#"{"message":"Internal server error"}"#.to_string());

        (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
    }
}
