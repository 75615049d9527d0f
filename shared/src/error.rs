use std::collections::BTreeMap;

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    UnprocessableEntity(String),
    #[error("{message}")]
    FieldValidationError {
        field: &'static str,
        message: String,
    },
    #[error("{0}")]
    EntityNotFound(String),
    #[error("{0}")]
    ValidationError(#[from] garde::Report),
    #[error("failed to start or commit a transaction")]
    TransactionError(#[source] sqlx::Error),
    #[error("failed to run a database query")]
    SpecificOperationError(#[source] sqlx::Error),
    #[error("{0}")]
    NoRowsAffectedError(String),
    #[error("{0}")]
    KeyValueStoreError(#[from] redis::RedisError),
    #[error("{0}")]
    ExternalServiceError(String),
    #[error("the office is being booked by another request, try again shortly")]
    LockTimeout,
    #[error("{0}")]
    ConvertToUuidError(#[from] uuid::Error),
    #[error("unauthenticated")]
    UnauthenticatedError,
    #[error("not allowed to perform this operation")]
    ForbiddenOperation,
    #[error("{0}")]
    ConversionEntityError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let status_code = match &self {
            AppError::UnprocessableEntity(_)
            | AppError::FieldValidationError { .. }
            | AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::EntityNotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConvertToUuidError(_) => StatusCode::BAD_REQUEST,
            AppError::UnauthenticatedError => StatusCode::UNAUTHORIZED,
            AppError::ForbiddenOperation => StatusCode::FORBIDDEN,
            AppError::LockTimeout => StatusCode::SERVICE_UNAVAILABLE,
            e @ (AppError::TransactionError(_)
            | AppError::SpecificOperationError(_)
            | AppError::NoRowsAffectedError(_)
            | AppError::KeyValueStoreError(_)
            | AppError::ExternalServiceError(_)
            | AppError::ConversionEntityError(_)) => {
                tracing::error!(
                    error.cause_chain = ?e,
                    error.message = %e,
                    "unexpected error happened"
                );
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = match &self {
            AppError::FieldValidationError { field, message } => json!({
                "message": message,
                "errors": { *field: [message] },
            }),
            AppError::ValidationError(report) => {
                let mut errors: BTreeMap<String, Vec<String>> = BTreeMap::new();
                for (path, error) in report.iter() {
                    errors
                        .entry(path.to_string())
                        .or_default()
                        .push(error.to_string());
                }
                json!({ "message": "The given data was invalid.", "errors": errors })
            }
            _ => json!({ "message": self.to_string() }),
        };

        (status_code, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_validation_errors_map_to_unprocessable_entity() {
        let err = AppError::FieldValidationError {
            field: "office_id",
            message: "Invalid office ID".into(),
        };
        assert_eq!(
            err.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn lock_timeout_is_retryable() {
        assert_eq!(
            AppError::LockTimeout.into_response().status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn ownership_violations_are_forbidden() {
        assert_eq!(
            AppError::ForbiddenOperation.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }
}
