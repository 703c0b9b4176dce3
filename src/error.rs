use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;
use tracing::error;

#[derive(Debug, ThisError)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Username is already registered!")]
    DuplicateUsername,

    #[error("Invalid username or password!")]
    AuthenticationFailure,

    #[error("Please log in first!")]
    Unauthenticated,

    #[error("Not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] SqlxError),

    #[error("Password hashing error: {0}")]
    PasswordHash(String),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Maps a unique-constraint violation to `DuplicateUsername`; everything
    /// else stays a storage failure.
    pub fn from_user_insert(err: SqlxError) -> Self {
        match &err {
            SqlxError::Database(db) if db.is_unique_violation() => Self::DuplicateUsername,
            _ => Self::Database(err),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::DuplicateUsername => StatusCode::CONFLICT,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::AuthenticationFailure | AppError::Unauthenticated => {
                StatusCode::UNAUTHORIZED
            }
            AppError::Database(_)
            | AppError::PasswordHash(_)
            | AppError::Template(_)
            | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = if status.is_server_error() {
            error!(error = %self, "request failed");
            "An internal server error occurred.".to_string()
        } else {
            self.to_string()
        };
        let body = format!(
            "<!doctype html><html><head><title>{code}</title></head>\
             <body><h1>{code}</h1><p>{message}</p></body></html>",
            code = status.as_u16(),
        );
        (status, Html(body)).into_response()
    }
}
