//! JWT-based authentication extractor for Axum handlers.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tesis_core::error::CoreError;
use tesis_core::roles::EvaluatorRole;
use tesis_core::types::DbId;

use crate::auth::jwt::validate_token;
use crate::error::AppError;
use crate::state::AppState;

/// Evaluator extracted from a JWT Bearer token in the `Authorization` header.
#[derive(Debug, Clone)]
pub struct AuthUser {
    /// From `claims.sub`.
    pub evaluator_id: DbId,
    pub role: EvaluatorRole,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| {
                AppError::Core(CoreError::Unauthorized(
                    "Missing Authorization header".into(),
                ))
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::Core(CoreError::Unauthorized(
                "Invalid Authorization format. Expected: Bearer <token>".into(),
            ))
        })?;

        let claims = validate_token(token, &state.config.jwt).map_err(|_| {
            AppError::Core(CoreError::Unauthorized("Invalid or expired token".into()))
        })?;

        // A valid token for a role outside the evaluation workflow.
        let role = EvaluatorRole::from_str_value(&claims.role).map_err(|_| {
            AppError::Core(CoreError::Forbidden(format!(
                "Role '{}' does not take part in defense evaluation",
                claims.role
            )))
        })?;

        Ok(AuthUser {
            evaluator_id: claims.sub,
            role,
        })
    }
}
