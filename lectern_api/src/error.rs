use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use lectern_core::prelude::*;
use serde_json::{json, Map, Value};
use validator::ValidationErrors;

/// Application-level error type for HTTP handlers.
///
/// Wraps the service errors of `lectern_core` and adds the HTTP-only
/// failures. Every variant renders as `{"error", "code"}` JSON, plus
/// `"fields"` for validation failures.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Catalog(#[from] CatalogServiceError),

    #[error(transparent)]
    Progress(#[from] ProgressServiceError),

    #[error(transparent)]
    Comments(#[from] CommentsServiceError),

    /// Missing or unusable `x-user-id` header.
    #[error("{0}")]
    Unauthorized(String),

    /// Body or path that could not be decoded.
    #[error("{0}")]
    BadRequest(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message, fields) = match &self {
            AppError::Catalog(err) => classify(err),
            AppError::Progress(err) => classify(err),
            AppError::Comments(err) => classify(err),
            AppError::Unauthorized(msg) => {
                (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone(), None)
            }
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone(), None),
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(fields) = fields {
            body["fields"] = fields;
        }

        (status, axum::Json(body)).into_response()
    }
}

fn classify<E: Classify>(err: &E) -> (StatusCode, &'static str, String, Option<Value>) {
    match err.kind() {
        ErrorKind::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN", err.to_string(), None),
        ErrorKind::NotFound => (StatusCode::NOT_FOUND, "NOT_FOUND", err.to_string(), None),
        ErrorKind::Invalid => (
            StatusCode::UNPROCESSABLE_ENTITY,
            "VALIDATION_ERROR",
            err.to_string(),
            err.field_errors().map(field_messages),
        ),
        ErrorKind::Conflict => (StatusCode::CONFLICT, "CONFLICT", err.to_string(), None),
        ErrorKind::Internal => {
            tracing::error!(error = %err, source = ?std::error::Error::source(err), "internal error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
                None,
            )
        }
    }
}

/// `{"field": ["message", ...]}`, falling back to the rule code when a rule
/// has no message.
fn field_messages(errors: &ValidationErrors) -> Value {
    let fields: Map<String, Value> = errors
        .field_errors()
        .into_iter()
        .map(|(field, errs)| {
            let messages: Vec<String> = errs
                .iter()
                .map(|e| match &e.message {
                    Some(message) => message.to_string(),
                    None => e.code.to_string(),
                })
                .collect();
            (field.to_string(), json!(messages))
        })
        .collect();

    Value::Object(fields)
}
