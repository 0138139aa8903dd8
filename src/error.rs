// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.
//!
//! Store and validation failures are translated into [`AppError`] exactly
//! once, through the `From` impls below. [`IntoResponse`] is the only place
//! an error becomes a status code.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use std::collections::BTreeMap;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Field path -> every message reported for that field.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Key validator uses for struct-level (schema) errors.
const SCHEMA_ERRORS_KEY: &str = "__all__";

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("You do not have permission to perform this operation")]
    Forbidden,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("A user with that username or email already exists")]
    AlreadyExists,

    #[error("Validation failed")]
    ValidationFailed(FieldErrors),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

/// JSON error response body
#[derive(Serialize)]
#[serde(untagged)]
enum ErrorResponse {
    Message { error: String },
    Fields { errors: FieldErrors },
}

impl AppError {
    /// Status code for this error's class.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized | AppError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyExists => StatusCode::CONFLICT,
            AppError::ValidationFailed(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let body = match self {
            AppError::ValidationFailed(errors) => ErrorResponse::Fields { errors },
            AppError::NotFound(msg) => {
                tracing::debug!(detail = %msg, "Not found");
                ErrorResponse::Message {
                    error: "not found".to_string(),
                }
            }
            AppError::Database(msg) => {
                tracing::error!(error = %msg, "Database error");
                ErrorResponse::Message {
                    error: "internal server error".to_string(),
                }
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                ErrorResponse::Message {
                    error: "internal server error".to_string(),
                }
            }
            other => ErrorResponse::Message {
                error: other.to_string(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        use sqlx::error::ErrorKind;

        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound("row not found".to_string()),
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation => AppError::AlreadyExists,
                ErrorKind::CheckViolation => AppError::BadRequest(format!(
                    "constraint violated: {}",
                    db_err.constraint().unwrap_or("check")
                )),
                ErrorKind::ForeignKeyViolation => {
                    AppError::NotFound("referenced record does not exist".to_string())
                }
                _ => AppError::Database(err.to_string()),
            },
            _ => AppError::Database(err.to_string()),
        }
    }
}

impl From<ValidationErrors> for AppError {
    fn from(errors: ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();
        collect_field_errors(&errors, "", &mut fields);
        AppError::ValidationFailed(fields)
    }
}

/// Flatten nested and list validation errors into dotted field paths.
fn collect_field_errors(errors: &ValidationErrors, prefix: &str, out: &mut FieldErrors) {
    for (field, kind) in errors.errors() {
        let field = field.to_string();
        let path = match (prefix.is_empty(), field == SCHEMA_ERRORS_KEY) {
            (true, true) => "body".to_string(),
            (false, true) => prefix.to_string(),
            (true, false) => field,
            (false, false) => format!("{prefix}.{field}"),
        };

        match kind {
            ValidationErrorsKind::Field(list) => {
                let messages = out.entry(path).or_default();
                messages.extend(list.iter().map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string())
                }));
            }
            ValidationErrorsKind::Struct(nested) => collect_field_errors(nested, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_field_errors(nested, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
