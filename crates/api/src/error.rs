use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use coursemart_core::error::CoreError;
use coursemart_payments::GatewayError;
use serde_json::json;

/// Message used for every authentication failure, whatever the cause.
pub const AUTH_REQUIRED: &str = "Authentication required";

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `coursemart_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A database error from sqlx.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// A payment provider error.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// A resource addressed by something other than its numeric id.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// The uniform 401 used by the auth extractors.
    pub fn unauthenticated() -> Self {
        AppError::Core(CoreError::Unauthorized(AUTH_REQUIRED.into()))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- Database errors ---
            AppError::Database(err) => classify_sqlx_error(err),

            // --- Payment provider errors ---
            AppError::Gateway(err) => classify_gateway_error(err),

            // --- HTTP-specific errors ---
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Postgres SQLSTATE codes the API translates instead of reporting a 500.
const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";

/// What a duplicate on each unique constraint means to the caller.
///
/// Handlers check most of these up front; the constraint catches the
/// requests that race past those checks.
fn duplicate_message(constraint: &str) -> &'static str {
    match constraint {
        "uq_users_email" => "Email already registered",
        "uq_courses_slug" => "A course with this slug already exists",
        "uq_enrollments_user_course" => "Already enrolled in this course",
        "uq_affiliates_user_id" => "Already registered as an affiliate",
        "uq_affiliates_code" => "Affiliate code already in use",
        "uq_landing_pages_slug" => "A landing page with this slug already exists",
        "uq_app_configs_key" => "Config key already exists",
        _ => "Duplicate record",
    }
}

fn internal_database_error(err: &dyn std::fmt::Display) -> (StatusCode, &'static str, String) {
    tracing::error!(error = %err, "Database error");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

/// Map a sqlx error onto a response.
///
/// `RowNotFound` is a 404, known constraint violations become 409/400 with a
/// message naming the problem, and anything else is a sanitized 500.
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    let sqlx::Error::Database(db_err) = err else {
        if matches!(err, sqlx::Error::RowNotFound) {
            return (StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found".to_string());
        }
        return internal_database_error(err);
    };

    let constraint = db_err.constraint().unwrap_or_default();
    match db_err.code().as_deref() {
        Some(UNIQUE_VIOLATION) => {
            tracing::debug!(constraint, "Unique constraint rejected write");
            (StatusCode::CONFLICT, "CONFLICT", duplicate_message(constraint).to_string())
        }
        Some(FOREIGN_KEY_VIOLATION) => {
            tracing::debug!(constraint, "Foreign key rejected write");
            (
                StatusCode::CONFLICT,
                "CONFLICT",
                "Referenced record is missing or still in use".to_string(),
            )
        }
        Some(CHECK_VIOLATION) => {
            tracing::debug!(constraint, "Check constraint rejected write");
            (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                format!("Invalid value ({constraint})"),
            )
        }
        _ => internal_database_error(db_err),
    }
}

/// Gateway failures surface as 400 with the provider message. Transport
/// failures keep their detail out of the response body.
fn classify_gateway_error(err: &GatewayError) -> (StatusCode, &'static str, String) {
    match err {
        GatewayError::Request(e) => {
            tracing::error!(error = %e, "Payment provider unreachable");
            (
                StatusCode::BAD_REQUEST,
                "PAYMENT_ERROR",
                "Payment provider unavailable".to_string(),
            )
        }
        GatewayError::Api { status, body } => {
            tracing::warn!(provider_status = status, body = %body, "Payment provider refused request");
            (
                StatusCode::BAD_REQUEST,
                "PAYMENT_ERROR",
                format!("Payment provider refused the request ({status})"),
            )
        }
        other => (StatusCode::BAD_REQUEST, "PAYMENT_ERROR", other.to_string()),
    }
}
