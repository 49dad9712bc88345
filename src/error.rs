use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Not found")]
    NotFound,

    #[error("A record with this {field} already exists")]
    Duplicate { field: &'static str },

    #[error("{field} is required")]
    RequiredField { field: &'static str },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },

    #[error("Invalid request body: {0}")]
    InvalidPayload(#[from] JsonRejection),

    #[error("Invalid query: {0}")]
    InvalidQuery(#[from] QueryRejection),

    #[error("Could not validate credentials")]
    Unauthorized,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl AppError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        AppError::Validation {
            field,
            message: message.into(),
        }
    }
}

/// Unique-index violations are the storage layer's last word on duplicates,
/// so they surface as the same errors the application-level checks raise.
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                let message = db_err.message();
                if message.contains("todos.previous_todo_id") {
                    return AppError::Conflict(
                        "A successor already exists for this task".to_string(),
                    );
                }
                if message.contains("todos.name") {
                    return AppError::Duplicate { field: "name" };
                }
                if message.contains("accounts.username") {
                    return AppError::Duplicate { field: "username" };
                }
            }
        }
        AppError::Database(err)
    }
}

impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Database(err.into())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<&'static str>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let field = match &self {
            AppError::Duplicate { field }
            | AppError::RequiredField { field }
            | AppError::Validation { field, .. } => Some(*field),
            _ => None,
        };

        let (status, error_message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not Found".to_string()),
            AppError::Duplicate { .. } | AppError::Conflict(_) => {
                (StatusCode::CONFLICT, self.to_string())
            }
            AppError::RequiredField { .. } | AppError::Validation { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            AppError::InvalidPayload(rejection) => (rejection.status(), rejection.body_text()),
            AppError::InvalidQuery(rejection) => (rejection.status(), rejection.body_text()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Database(e) => {
                error!("database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error occurred".to_string(),
                )
            }
            AppError::Configuration(msg) => {
                error!("configuration error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: status.to_string(),
            message: error_message,
            field,
        });

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_maps_to_conflict_with_field() {
        let response = AppError::Duplicate { field: "name" }.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_required_field_maps_to_unprocessable() {
        let response = AppError::RequiredField { field: "due_date" }.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_row_not_found_stays_database_error() {
        let err = AppError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, AppError::Database(_)));
    }
}
