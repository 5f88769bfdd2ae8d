//! Defense record store abstraction.
//!
//! The workflow engine reads and writes defenses only through
//! [`DefenseStore`]. Two implementations exist: [`InMemoryDefenseStore`]
//! here, and the PostgreSQL store in the `tesis-db` crate.
//!
//! Implementations must:
//! - serialize writes on the same (defense, evaluator) pair so the
//!   evaluation upsert is last-write-wins by completion;
//! - apply [`FinalizeDefense`] (optional grade upsert, record, status) as a
//!   single atomic write;
//! - refuse both writes with [`CoreError::Conflict`] once a defense has a
//!   finalization record.

mod memory;

use async_trait::async_trait;

use crate::defense::{Defense, DefenseKind, DefenseStatus, FinalizationRecord, ParticipantEvaluation};
use crate::error::CoreError;
use crate::proposal::ProposalBundle;
use crate::roles::EvaluatorRole;
use crate::types::DbId;

pub use memory::{InMemoryDefenseStore, NewDeliverable, NewProposal};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, CoreError>;

/// Upsert of one evaluator's grade on one defense.
#[derive(Debug, Clone, PartialEq)]
pub struct UpsertEvaluation {
    pub defense_id: DbId,
    pub evaluator_id: DbId,
    pub evaluator_role: EvaluatorRole,
    pub grade: f64,
    pub comment: String,
}

/// Composite finalization write.
#[derive(Debug, Clone, PartialEq)]
pub struct FinalizeDefense {
    pub defense_id: DbId,
    pub finalized_by: DbId,
    pub finalizer_role: EvaluatorRole,
    pub final_status: DefenseStatus,
    pub comments: String,
    /// The finalizer's own grade, written in the same transaction.
    pub evaluation: Option<UpsertEvaluation>,
}

#[async_trait]
pub trait DefenseStore: Send + Sync {
    /// Proposals whose status makes them eligible for defense.
    async fn list_eligible_proposals(&self) -> StoreResult<Vec<ProposalBundle>>;

    async fn find_proposal(&self, proposal_id: DbId) -> StoreResult<Option<ProposalBundle>>;

    async fn find_defense(&self, defense_id: DbId) -> StoreResult<Option<Defense>>;

    /// The defense of `kind` belonging to `proposal_id`.
    async fn find_defense_for_proposal(
        &self,
        proposal_id: DbId,
        kind: DefenseKind,
    ) -> StoreResult<Option<Defense>>;

    /// Defenses where the evaluator is rostered or has graded.
    async fn list_defenses_for_evaluator(&self, evaluator_id: DbId) -> StoreResult<Vec<Defense>>;

    async fn upsert_evaluation(&self, input: &UpsertEvaluation)
        -> StoreResult<ParticipantEvaluation>;

    async fn finalize_defense(&self, input: &FinalizeDefense) -> StoreResult<FinalizationRecord>;
}
