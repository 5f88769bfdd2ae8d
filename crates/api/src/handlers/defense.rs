//! Handlers for grading and finalizing defenses.
//!
//! Defense routes carry the defense kind in the path
//! (`/defenses/{kind}/{defense_id}/...`). A defense whose stored kind differs
//! from the path is reported as not found.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tesis_core::defense::{Defense, DefenseKind, DefenseStatus};
use tesis_core::error::CoreError;
use tesis_core::roles::{allowed_actions, can_finalize, ActionKind, EvaluatorRole};
use tesis_core::types::DbId;
use tesis_core::workflow::{FinalizeInput, GradeInput};
use tesis_events::DefenseEvent;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::json::AppJson;
use crate::middleware::rbac::{RequireAuth, RequireFinalizer};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response DTOs
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct GradeRequest {
    #[validate(range(min = 0.0, max = 10.0))]
    pub grade: f64,
    #[validate(length(min = 1, max = 5000))]
    pub comment: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct FinalizeRequest {
    /// `APROBADA`, `RECHAZADA` or `APROBADA_CON_COMENTARIOS`.
    pub status: String,
    #[validate(length(min = 1, max = 5000))]
    pub comments: String,
    /// The finalizer's own grade, recorded together with the decision.
    #[validate(range(min = 0.0, max = 10.0))]
    pub grade: Option<f64>,
}

/// What the caller may do on a defense.
#[derive(Debug, Serialize)]
pub struct AllowedActions {
    pub role: EvaluatorRole,
    pub can_finalize: bool,
    pub actions: Vec<ActionKind>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_kind(kind: &str) -> AppResult<DefenseKind> {
    DefenseKind::from_str_value(kind)
        .map_err(|e| AppError::Core(CoreError::invalid_field("kind", e.to_string())))
}

/// Load a defense and check it matches the kind named in the path.
async fn resolve_defense(state: &AppState, kind: &str, defense_id: DbId) -> AppResult<Defense> {
    let kind = parse_kind(kind)?;
    let defense = state.workflow.defense(defense_id).await?;
    if defense.kind != kind {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Defense",
            id: defense_id,
        }));
    }
    Ok(defense)
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/defenses/{kind}/{defense_id}/grade
///
/// Record or replace the caller's grade. Jury members and tutors go through
/// the jury submission; directors and coordinators record their own grade
/// without deciding.
pub async fn grade(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path((kind, defense_id)): Path<(String, DbId)>,
    AppJson(input): AppJson<GradeRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let defense = resolve_defense(&state, &kind, defense_id).await?;

    let grade_input = GradeInput {
        defense_id,
        evaluator_id: user.evaluator_id,
        evaluator_role: user.role,
        grade: input.grade,
        comment: input.comment,
    };
    let evaluation = if user.role.is_jury() {
        state.workflow.submit_jury_grade(grade_input).await?
    } else {
        state.workflow.grade(grade_input).await?
    };

    tracing::info!(
        defense_id,
        kind = defense.kind.path_segment(),
        evaluator_id = user.evaluator_id,
        role = user.role.as_str(),
        grade = evaluation.grade,
        "Defense graded",
    );
    state.event_bus.publish(DefenseEvent::graded(&evaluation));

    Ok(Json(DataResponse { data: evaluation }))
}

/// POST /api/v1/defenses/{kind}/{defense_id}/finalize
///
/// Decide the outcome of a defense. Directors and coordinators only.
pub async fn finalize(
    RequireFinalizer(user): RequireFinalizer,
    State(state): State<AppState>,
    Path((kind, defense_id)): Path<(String, DbId)>,
    AppJson(input): AppJson<FinalizeRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let final_status = DefenseStatus::from_str_value(&input.status)
        .map_err(|e| AppError::Core(CoreError::invalid_field("status", e.to_string())))?;
    let defense = resolve_defense(&state, &kind, defense_id).await?;

    let record = state
        .workflow
        .finalize(FinalizeInput {
            defense_id,
            finalizer_id: user.evaluator_id,
            finalizer_role: user.role,
            final_status,
            grade: input.grade,
            comments: input.comments,
        })
        .await?;

    tracing::info!(
        defense_id,
        kind = defense.kind.path_segment(),
        evaluator_id = user.evaluator_id,
        role = user.role.as_str(),
        status = record.final_status.as_str(),
        with_grade = input.grade.is_some(),
        "Defense finalized",
    );
    state.event_bus.publish(DefenseEvent::finalized(&record));

    Ok(Json(DataResponse { data: record }))
}

/// GET /api/v1/defenses/{kind}/{defense_id}/jury-comments
///
/// Jury and tutor grades with comments, oldest first. An unknown defense
/// has no comments yet and yields an empty list.
pub async fn jury_comments(
    _finalizer: RequireFinalizer,
    State(state): State<AppState>,
    Path((kind, defense_id)): Path<(String, DbId)>,
) -> AppResult<impl IntoResponse> {
    let comments = match resolve_defense(&state, &kind, defense_id).await {
        Ok(_) => state.workflow.jury_comments(defense_id).await?,
        Err(AppError::Core(CoreError::NotFound { .. })) => vec![],
        Err(e) => return Err(e),
    };
    Ok(Json(DataResponse { data: comments }))
}

/// GET /api/v1/defenses/{kind}/{defense_id}/my-evaluation
///
/// The caller's own grade and comment, or `null` before grading.
pub async fn my_evaluation(
    RequireAuth(user): RequireAuth,
    State(state): State<AppState>,
    Path((kind, defense_id)): Path<(String, DbId)>,
) -> AppResult<impl IntoResponse> {
    resolve_defense(&state, &kind, defense_id).await?;
    let evaluation = state
        .workflow
        .my_evaluation(defense_id, user.evaluator_id)
        .await?;
    Ok(Json(DataResponse { data: evaluation }))
}

/// GET /api/v1/defenses/actions
///
/// The actions the caller's role is offered on a defense.
pub async fn allowed(RequireAuth(user): RequireAuth) -> AppResult<impl IntoResponse> {
    let actions = AllowedActions {
        role: user.role,
        can_finalize: can_finalize(user.role),
        actions: allowed_actions(user.role).into_iter().collect(),
    };
    Ok(Json(DataResponse { data: actions }))
}
