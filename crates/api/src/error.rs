use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tesis_core::error::CoreError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `tesis_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Request DTO failed its declarative checks.
    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    /// The body could not be read as the expected JSON shape.
    #[error("Invalid request body: {message}")]
    InvalidBody {
        message: String,
        field: Option<String>,
    },
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

const STORE_UNAVAILABLE: &str = "The defense store is temporarily unavailable";

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut field: Option<String> = None;

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
                CoreError::InvalidField { field: name, message } => {
                    field = Some((*name).to_string());
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Store(msg) => {
                    tracing::error!(error = %msg, "Defense store error");
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "STORE_ERROR",
                        STORE_UNAVAILABLE.to_string(),
                    )
                }
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            // --- HTTP-specific errors ---
            AppError::Validation(errors) => {
                let mut names: Vec<String> = errors
                    .field_errors()
                    .keys()
                    .map(|name| name.to_string())
                    .collect();
                names.sort();
                let message = match names.first() {
                    Some(name) => format!("Invalid value for field '{name}'"),
                    None => "Invalid request body".to_string(),
                };
                field = names.into_iter().next();
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message)
            }
            AppError::InvalidBody {
                message,
                field: name,
            } => {
                field = name.clone();
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", message.clone())
            }
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let Some(field) = field {
            body["field"] = json!(field);
        }

        (status, axum::Json(body)).into_response()
    }
}
