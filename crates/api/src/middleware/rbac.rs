//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! meet the requirement, so authorization is enforced before the body is
//! even parsed.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use tesis_core::error::CoreError;
use tesis_core::roles::can_finalize;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Requires a role that may finalize defenses (`DIRECTOR`, `COORDINADOR`).
/// Rejects with 403 Forbidden otherwise.
pub struct RequireFinalizer(pub AuthUser);

impl FromRequestParts<AppState> for RequireFinalizer {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !can_finalize(user.role) {
            return Err(AppError::Core(CoreError::Forbidden(format!(
                "Role {} cannot finalize a defense",
                user.role.as_str()
            ))));
        }
        Ok(RequireFinalizer(user))
    }
}

/// Requires any authenticated evaluator.
///
/// Functionally equivalent to [`AuthUser`] but self-documenting in route
/// handlers.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(RequireAuth(user))
    }
}
