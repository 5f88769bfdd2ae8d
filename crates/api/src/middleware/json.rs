//! JSON body extractor that reports malformed bodies as [`AppError`].

use axum::extract::rejection::JsonRejection;
use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` whose rejection uses the API error envelope, so a missing
/// or mistyped field comes back as `400 VALIDATION_ERROR` with `field` set.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        let message = rejection.body_text();
        let field = match rejection {
            JsonRejection::JsonDataError(_) => offending_field(&message),
            _ => None,
        };
        AppError::InvalidBody { message, field }
    }
}

/// Pull the field name out of a serde deserialization message.
///
/// Handles `missing field `name`` and path-prefixed errors such as
/// `grade: invalid type: string "x", expected f64`.
fn offending_field(detail: &str) -> Option<String> {
    let detail = detail
        .split_once("target type: ")
        .map_or(detail, |(_, rest)| rest);

    let (path, inner) = match detail.split_once(": ") {
        Some((path, rest)) if !path.is_empty() && !path.contains(' ') => (Some(path), rest),
        _ => (None, detail),
    };
    let missing = inner
        .split_once("missing field `")
        .and_then(|(_, rest)| rest.split_once('`'))
        .map(|(name, _)| name);

    match (path, missing) {
        (Some(path), Some(name)) => Some(format!("{path}.{name}")),
        (Some(path), None) => Some(path.to_string()),
        (None, Some(name)) => Some(name.to_string()),
        (None, None) => None,
    }
}
