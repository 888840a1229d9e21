//! Error handling for the point-of-sale backend
//!
//! Every error is rendered with the same `{ code, message }` envelope used by
//! successful responses.

use axum::{
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::{billing::BillingError, types::ApiResponse};
use thiserror::Error;

/// Postgres SQLSTATE for unique constraint violations
const UNIQUE_VIOLATION: &str = "23505";

/// Postgres SQLSTATE for foreign key violations
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("user is inactive")]
    InactiveUser,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    // Validation errors
    #[error("{0}")]
    Validation(String),

    #[error("invalid role: {0}")]
    InvalidRole(String),

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("{0} not found")]
    NotFound(&'static str),

    // Business logic errors
    #[error("invoice already invoiced, cannot update")]
    InvoiceLocked,

    // Document pipeline errors
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Document error: {0}")]
    Document(String),

    // Database errors
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        let code = err
            .as_database_error()
            .and_then(|db| db.code())
            .map(|code| code.into_owned());

        match code.as_deref() {
            Some(UNIQUE_VIOLATION) => {
                let constraint = err
                    .as_database_error()
                    .and_then(|db| db.constraint())
                    .unwrap_or("record")
                    .to_string();
                AppError::DuplicateEntry(constraint)
            }
            // Rows referenced by id are checked up front; this covers deletes racing a write
            Some(FOREIGN_KEY_VIOLATION) => {
                AppError::Validation("referenced record does not exist".to_string())
            }
            _ => AppError::Database(err),
        }
    }
}

impl From<BillingError> for AppError {
    fn from(err: BillingError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(format!("invalid payload: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(format!("invalid query: {}", rejection.body_text()))
    }
}

impl AppError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidCredentials | AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::InactiveUser | AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) | AppError::InvalidRole(_) | AppError::InvoiceLocked => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DuplicateEntry(_) => StatusCode::CONFLICT,
            AppError::Storage(_)
            | AppError::Document(_)
            | AppError::Database(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client; server-side details stay in the logs
    pub fn client_message(&self) -> String {
        match self {
            AppError::InvalidRole(_) => "invalid role".to_string(),
            AppError::DuplicateEntry(_) => "a record with the same unique value already exists".to_string(),
            AppError::Database(_) => "a database error occurred".to_string(),
            AppError::Storage(_) | AppError::Document(_) => {
                "invoice document could not be produced".to_string()
            }
            AppError::Internal(_) => "an internal server error occurred".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log the error for debugging
        if status.is_server_error() {
            tracing::error!("Error: {:?}", self);
        } else {
            tracing::debug!(status = status.as_u16(), "Request rejected: {}", self);
        }

        let body = ApiResponse::message(status.as_u16(), self.client_message());
        (status, Json(body)).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::InactiveUser.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::InvoiceLocked.status(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::NotFound("invoice").status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::DuplicateEntry("users_email_key".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_client_messages() {
        assert_eq!(AppError::NotFound("invoice").client_message(), "invoice not found");
        assert_eq!(
            AppError::InvoiceLocked.client_message(),
            "invoice already invoiced, cannot update"
        );
        assert_eq!(AppError::InvalidRole("manager".into()).client_message(), "invalid role");
        assert_eq!(
            AppError::Internal("pool exhausted".into()).client_message(),
            "an internal server error occurred"
        );
    }

    #[test]
    fn test_billing_overflow_is_a_validation_error() {
        let err: AppError = BillingError::Overflow.into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.client_message(), "invoice amounts exceed the supported range");
    }

    #[test]
    fn test_sqlx_error_conversion() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::Database(_)));
    }
}
