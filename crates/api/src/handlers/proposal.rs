//! Handlers for the proposal listing and document readiness.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use tesis_core::types::DbId;

use crate::error::AppResult;
use crate::middleware::rbac::RequireAuth;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/proposals/eligible
///
/// Approved proposals with deliverables, readiness and defense summaries.
pub async fn list_eligible(
    _user: RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let proposals = state.workflow.eligible_proposals().await?;
    Ok(Json(DataResponse { data: proposals }))
}

/// GET /api/v1/proposals/{proposal_id}/readiness
pub async fn readiness(
    _user: RequireAuth,
    State(state): State<AppState>,
    Path(proposal_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let report = state.workflow.proposal_readiness(proposal_id).await?;
    Ok(Json(DataResponse { data: report }))
}
