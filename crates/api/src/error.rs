use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chamado_core::error::CoreError;
use serde_json::json;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent `{error, kind}` JSON
/// bodies; the kind is machine-readable so clients can surface the specific
/// correctable reason (which field is missing, why a file was rejected)
/// instead of a generic failure message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `chamado_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Missing or invalid credentials.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, kind, message, detail) = match &self {
            AppError::Core(core) => classify_core_error(core),

            AppError::Database(err) => classify_sqlx_error(err),

            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone(), None)
            }
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone(), None)
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let mut body = json!({
            "error": message,
            "kind": kind,
        });
        if let Some(detail) = detail {
            body["detail"] = detail;
        }

        (status, axum::Json(body)).into_response()
    }
}

/// Map a domain error onto (status, kind, message, structured detail).
///
/// `detail` carries the machine-readable payload some kinds require: the
/// evidence violation code, or the list of unmet field ids.
fn classify_core_error(
    err: &CoreError,
) -> (StatusCode, &'static str, String, Option<serde_json::Value>) {
    match err {
        CoreError::NotFound { .. } => {
            (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string(), None)
        }
        CoreError::TicketClosed { .. } => {
            (StatusCode::CONFLICT, "TICKET_CLOSED", err.to_string(), None)
        }
        CoreError::InvalidTransition { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "INVALID_TRANSITION",
            err.to_string(),
            None,
        ),
        CoreError::EvidenceRejected(violation) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "EVIDENCE_REJECTED",
            err.to_string(),
            Some(json!({ "reason": violation.code() })),
        ),
        CoreError::MissingRequiredFields(ids) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "MISSING_REQUIRED_FIELDS",
            err.to_string(),
            Some(json!({ "field_ids": ids })),
        ),
        CoreError::SameArea { .. } => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "SAME_AREA",
            err.to_string(),
            None,
        ),
        CoreError::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT", err.to_string(), None),
        CoreError::Validation(_) => (
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            err.to_string(),
            None,
        ),
        CoreError::DependencyUnavailable(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "DEPENDENCY_UNAVAILABLE",
            err.to_string(),
            None,
        ),
    }
}

/// Classify a sqlx error.
///
/// - `RowNotFound` maps to 404.
/// - Everything else is a collaborator failure: reported as
///   `DEPENDENCY_UNAVAILABLE` (503) rather than disguised as a validation
///   problem, and logged with the underlying cause.
fn classify_sqlx_error(
    err: &sqlx::Error,
) -> (StatusCode, &'static str, String, Option<serde_json::Value>) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
            None,
        ),
        other => {
            tracing::error!(error = %other, "Database error");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "DEPENDENCY_UNAVAILABLE",
                "A required dependency is unavailable".to_string(),
                None,
            )
        }
    }
}
