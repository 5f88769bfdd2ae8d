//! Handlers for the caller's own evaluation workload.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/evaluations/mine
///
/// Every defense the caller is rostered on or has graded, with their role,
/// prior grade and comment.
pub async fn list_mine(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let defenses = state
        .workflow
        .defenses_for_evaluator(user.evaluator_id)
        .await?;
    tracing::debug!(
        evaluator_id = user.evaluator_id,
        count = defenses.len(),
        "Listed evaluator defenses"
    );
    Ok(Json(DataResponse { data: defenses }))
}
