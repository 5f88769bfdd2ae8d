//! Evaluation and finalization rows.

use sqlx::FromRow;
use tesis_core::defense::{DefenseStatus, FinalizationRecord, ParticipantEvaluation};
use tesis_core::error::CoreError;
use tesis_core::roles::EvaluatorRole;
use tesis_core::types::{DbId, Timestamp};

use super::corrupt_row;

/// A row from the `defense_evaluations` table.
#[derive(Debug, Clone, FromRow)]
pub struct EvaluationRow {
    pub id: DbId,
    pub defense_id: DbId,
    pub evaluator_id: DbId,
    pub evaluator_role: String,
    pub grade: f64,
    pub comment: String,
    pub graded_at: Timestamp,
}

impl TryFrom<EvaluationRow> for ParticipantEvaluation {
    type Error = CoreError;

    fn try_from(row: EvaluationRow) -> Result<Self, Self::Error> {
        let evaluator_role = corrupt_row(
            "defense_evaluations",
            row.id,
            EvaluatorRole::from_str_value(&row.evaluator_role),
        )?;
        Ok(ParticipantEvaluation {
            id: row.id,
            defense_id: row.defense_id,
            evaluator_id: row.evaluator_id,
            evaluator_role,
            grade: row.grade,
            comment: row.comment,
            graded_at: row.graded_at,
        })
    }
}

/// A row from the `defense_finalizations` table.
#[derive(Debug, Clone, FromRow)]
pub struct FinalizationRow {
    pub id: DbId,
    pub defense_id: DbId,
    pub finalized_by: DbId,
    pub finalizer_role: String,
    pub final_status: String,
    pub comments: String,
    pub finalized_at: Timestamp,
}

impl TryFrom<FinalizationRow> for FinalizationRecord {
    type Error = CoreError;

    fn try_from(row: FinalizationRow) -> Result<Self, Self::Error> {
        let finalizer_role = corrupt_row(
            "defense_finalizations",
            row.id,
            EvaluatorRole::from_str_value(&row.finalizer_role),
        )?;
        let final_status = corrupt_row(
            "defense_finalizations",
            row.id,
            DefenseStatus::from_str_value(&row.final_status),
        )?;
        Ok(FinalizationRecord {
            id: row.id,
            defense_id: row.defense_id,
            finalized_by: row.finalized_by,
            finalizer_role,
            final_status,
            comments: row.comments,
            finalized_at: row.finalized_at,
        })
    }
}
