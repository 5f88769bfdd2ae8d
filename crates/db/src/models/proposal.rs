//! Proposal and deliverable rows.

use sqlx::FromRow;
use tesis_core::error::CoreError;
use tesis_core::proposal::{Proposal, ProposalStatus};
use tesis_core::readiness::{Deliverable, DeliverableKind};
use tesis_core::types::{DbId, Timestamp};

use super::corrupt_row;

/// A row from the `proposals` table.
#[derive(Debug, Clone, FromRow)]
pub struct ProposalRow {
    pub id: DbId,
    pub student_id: DbId,
    pub title: String,
    pub career: String,
    pub status: String,
    pub created_at: Timestamp,
}

impl TryFrom<ProposalRow> for Proposal {
    type Error = CoreError;

    fn try_from(row: ProposalRow) -> Result<Self, Self::Error> {
        let status = corrupt_row("proposals", row.id, ProposalStatus::from_str_value(&row.status))?;
        Ok(Proposal {
            id: row.id,
            student_id: row.student_id,
            title: row.title,
            career: row.career,
            status,
            created_at: row.created_at,
        })
    }
}

/// A row from the `deliverables` table.
#[derive(Debug, Clone, FromRow)]
pub struct DeliverableRow {
    pub id: DbId,
    pub proposal_id: DbId,
    pub kind: String,
    pub file_name: String,
    pub storage_key: String,
    pub is_active: bool,
    pub uploaded_at: Timestamp,
}

impl TryFrom<DeliverableRow> for Deliverable {
    type Error = CoreError;

    fn try_from(row: DeliverableRow) -> Result<Self, Self::Error> {
        let kind = corrupt_row("deliverables", row.id, DeliverableKind::from_str_value(&row.kind))?;
        Ok(Deliverable {
            id: row.id,
            proposal_id: row.proposal_id,
            kind,
            file_name: row.file_name,
            storage_key: row.storage_key,
            is_active: row.is_active,
            uploaded_at: row.uploaded_at,
        })
    }
}
