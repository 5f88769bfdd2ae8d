//! Defense and roster rows.

use sqlx::FromRow;
use tesis_core::defense::{
    Defense, DefenseKind, DefenseParticipant, DefenseStatus, FinalizationRecord,
    ParticipantEvaluation,
};
use tesis_core::error::CoreError;
use tesis_core::roles::EvaluatorRole;
use tesis_core::types::{DbId, Timestamp};

use super::corrupt_row;

/// A row from the `defenses` table.
#[derive(Debug, Clone, FromRow)]
pub struct DefenseRow {
    pub id: DbId,
    pub proposal_id: DbId,
    pub kind: String,
    pub status: String,
    pub scheduled_at: Option<Timestamp>,
    pub room: Option<String>,
}

impl DefenseRow {
    pub fn parsed_status(&self) -> Result<DefenseStatus, CoreError> {
        corrupt_row("defenses", self.id, DefenseStatus::from_str_value(&self.status))
    }

    /// Assemble the domain defense from this row and its child rows.
    pub fn into_domain(
        self,
        participants: Vec<DefenseParticipant>,
        evaluations: Vec<ParticipantEvaluation>,
        finalization: Option<FinalizationRecord>,
    ) -> Result<Defense, CoreError> {
        let kind = corrupt_row("defenses", self.id, DefenseKind::from_str_value(&self.kind))?;
        let status = self.parsed_status()?;
        Ok(Defense {
            id: self.id,
            proposal_id: self.proposal_id,
            kind,
            status,
            scheduled_at: self.scheduled_at,
            room: self.room,
            participants,
            evaluations,
            finalization,
        })
    }
}

/// A row from the `defense_participants` table.
#[derive(Debug, Clone, FromRow)]
pub struct ParticipantRow {
    pub defense_id: DbId,
    pub evaluator_id: DbId,
    pub role: String,
}

impl TryFrom<ParticipantRow> for DefenseParticipant {
    type Error = CoreError;

    fn try_from(row: ParticipantRow) -> Result<Self, Self::Error> {
        let role = corrupt_row(
            "defense_participants",
            row.defense_id,
            EvaluatorRole::from_str_value(&row.role),
        )?;
        Ok(DefenseParticipant {
            evaluator_id: row.evaluator_id,
            role,
        })
    }
}
