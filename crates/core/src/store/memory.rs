//! In-memory defense store for development and tests.
//!
//! All tables sit behind one `tokio::sync::RwLock`, so every write is
//! serialized and the finalization composite is applied under a single
//! write guard.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{DefenseStore, FinalizeDefense, StoreResult, UpsertEvaluation};
use crate::defense::{
    Defense, DefenseKind, DefenseParticipant, DefenseStatus, FinalizationRecord,
    ParticipantEvaluation,
};
use crate::error::CoreError;
use crate::proposal::{Proposal, ProposalBundle, ProposalStatus};
use crate::readiness::{Deliverable, DeliverableKind};
use crate::roles::EvaluatorRole;
use crate::types::{DbId, Timestamp};

/// Input for seeding a proposal.
#[derive(Debug, Clone)]
pub struct NewProposal {
    pub student_id: DbId,
    pub title: String,
    pub career: String,
    pub status: ProposalStatus,
}

/// Input for uploading a deliverable version.
#[derive(Debug, Clone)]
pub struct NewDeliverable {
    pub proposal_id: DbId,
    pub kind: DeliverableKind,
    pub file_name: String,
}

#[derive(Debug, Default)]
struct Tables {
    proposals: BTreeMap<DbId, Proposal>,
    deliverables: Vec<Deliverable>,
    defenses: BTreeMap<DbId, Defense>,
    next_id: DbId,
}

impl Tables {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }

    fn bundle(&self, proposal: &Proposal) -> ProposalBundle {
        ProposalBundle {
            proposal: proposal.clone(),
            deliverables: self
                .deliverables
                .iter()
                .filter(|d| d.proposal_id == proposal.id)
                .cloned()
                .collect(),
            defenses: self
                .defenses
                .values()
                .filter(|d| d.proposal_id == proposal.id)
                .cloned()
                .collect(),
        }
    }

    fn open_defense_mut(&mut self, defense_id: DbId) -> StoreResult<&mut Defense> {
        let defense = self
            .defenses
            .get_mut(&defense_id)
            .ok_or(CoreError::NotFound {
                entity: "Defense",
                id: defense_id,
            })?;
        if defense.finalization.is_some() || defense.status.is_terminal() {
            return Err(CoreError::Conflict(format!(
                "Defense {defense_id} has already been finalized as {}",
                defense.status.as_str()
            )));
        }
        Ok(defense)
    }

    fn apply_evaluation(
        &mut self,
        input: &UpsertEvaluation,
        now: Timestamp,
    ) -> StoreResult<ParticipantEvaluation> {
        let fresh_id = self.next_id();
        let defense = self.open_defense_mut(input.defense_id)?;

        match defense
            .evaluations
            .iter_mut()
            .find(|e| e.evaluator_id == input.evaluator_id)
        {
            Some(existing) => {
                existing.evaluator_role = input.evaluator_role;
                existing.grade = input.grade;
                existing.comment = input.comment.clone();
                existing.graded_at = now;
                Ok(existing.clone())
            }
            None => {
                let evaluation = ParticipantEvaluation {
                    id: fresh_id,
                    defense_id: input.defense_id,
                    evaluator_id: input.evaluator_id,
                    evaluator_role: input.evaluator_role,
                    grade: input.grade,
                    comment: input.comment.clone(),
                    graded_at: now,
                };
                defense.evaluations.push(evaluation.clone());
                Ok(evaluation)
            }
        }
    }
}

/// Process-local [`DefenseStore`].
#[derive(Debug, Default)]
pub struct InMemoryDefenseStore {
    tables: RwLock<Tables>,
}

impl InMemoryDefenseStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_proposal(&self, input: NewProposal) -> Proposal {
        let mut tables = self.tables.write().await;
        let proposal = Proposal {
            id: tables.next_id(),
            student_id: input.student_id,
            title: input.title,
            career: input.career,
            status: input.status,
            created_at: Utc::now(),
        };
        tables.proposals.insert(proposal.id, proposal.clone());
        proposal
    }

    /// Upload a new deliverable version. The previous active version of the
    /// same kind is superseded, not removed.
    pub async fn add_deliverable(&self, input: NewDeliverable) -> StoreResult<Deliverable> {
        let mut tables = self.tables.write().await;
        if !tables.proposals.contains_key(&input.proposal_id) {
            return Err(CoreError::NotFound {
                entity: "Proposal",
                id: input.proposal_id,
            });
        }

        for previous in tables
            .deliverables
            .iter_mut()
            .filter(|d| d.proposal_id == input.proposal_id && d.kind == input.kind)
        {
            previous.is_active = false;
        }

        let id = tables.next_id();
        let deliverable = Deliverable {
            id,
            proposal_id: input.proposal_id,
            kind: input.kind,
            storage_key: format!("proposals/{}/{}/{id}", input.proposal_id, input.kind.as_str()),
            file_name: input.file_name,
            is_active: true,
            uploaded_at: Utc::now(),
        };
        tables.deliverables.push(deliverable.clone());
        Ok(deliverable)
    }

    /// Create a defense for a proposal. At most one per kind.
    pub async fn insert_defense(
        &self,
        proposal_id: DbId,
        kind: DefenseKind,
        status: DefenseStatus,
    ) -> StoreResult<Defense> {
        let mut tables = self.tables.write().await;
        if !tables.proposals.contains_key(&proposal_id) {
            return Err(CoreError::NotFound {
                entity: "Proposal",
                id: proposal_id,
            });
        }
        if tables
            .defenses
            .values()
            .any(|d| d.proposal_id == proposal_id && d.kind == kind)
        {
            return Err(CoreError::Conflict(format!(
                "Proposal {proposal_id} already has a {} defense",
                kind.as_str()
            )));
        }

        let defense = Defense {
            id: tables.next_id(),
            proposal_id,
            kind,
            status,
            scheduled_at: None,
            room: None,
            participants: vec![],
            evaluations: vec![],
            finalization: None,
        };
        tables.defenses.insert(defense.id, defense.clone());
        Ok(defense)
    }

    /// Add an evaluator to a defense roster, replacing any previous role.
    pub async fn assign_participant(
        &self,
        defense_id: DbId,
        evaluator_id: DbId,
        role: EvaluatorRole,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let defense = tables
            .defenses
            .get_mut(&defense_id)
            .ok_or(CoreError::NotFound {
                entity: "Defense",
                id: defense_id,
            })?;
        defense.participants.retain(|p| p.evaluator_id != evaluator_id);
        defense.participants.push(DefenseParticipant { evaluator_id, role });
        Ok(())
    }

    /// Move a defense through the scheduling statuses.
    pub async fn set_defense_status(
        &self,
        defense_id: DbId,
        status: DefenseStatus,
    ) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let defense = tables
            .defenses
            .get_mut(&defense_id)
            .ok_or(CoreError::NotFound {
                entity: "Defense",
                id: defense_id,
            })?;
        defense.status = status;
        Ok(())
    }
}

#[async_trait]
impl DefenseStore for InMemoryDefenseStore {
    async fn list_eligible_proposals(&self) -> StoreResult<Vec<ProposalBundle>> {
        let tables = self.tables.read().await;
        Ok(tables
            .proposals
            .values()
            .filter(|p| p.status.is_eligible_for_defense())
            .map(|p| tables.bundle(p))
            .collect())
    }

    async fn find_proposal(&self, proposal_id: DbId) -> StoreResult<Option<ProposalBundle>> {
        let tables = self.tables.read().await;
        Ok(tables.proposals.get(&proposal_id).map(|p| tables.bundle(p)))
    }

    async fn find_defense(&self, defense_id: DbId) -> StoreResult<Option<Defense>> {
        let tables = self.tables.read().await;
        Ok(tables.defenses.get(&defense_id).cloned())
    }

    async fn find_defense_for_proposal(
        &self,
        proposal_id: DbId,
        kind: DefenseKind,
    ) -> StoreResult<Option<Defense>> {
        let tables = self.tables.read().await;
        Ok(tables
            .defenses
            .values()
            .find(|d| d.proposal_id == proposal_id && d.kind == kind)
            .cloned())
    }

    async fn list_defenses_for_evaluator(&self, evaluator_id: DbId) -> StoreResult<Vec<Defense>> {
        let tables = self.tables.read().await;
        Ok(tables
            .defenses
            .values()
            .filter(|d| d.involves(evaluator_id))
            .cloned()
            .collect())
    }

    async fn upsert_evaluation(
        &self,
        input: &UpsertEvaluation,
    ) -> StoreResult<ParticipantEvaluation> {
        let mut tables = self.tables.write().await;
        tables.apply_evaluation(input, Utc::now())
    }

    async fn finalize_defense(&self, input: &FinalizeDefense) -> StoreResult<FinalizationRecord> {
        let mut tables = self.tables.write().await;
        // Both checks run before anything is written so a failure leaves
        // the defense untouched.
        tables.open_defense_mut(input.defense_id)?;
        if let Some(evaluation) = &input.evaluation {
            if evaluation.defense_id != input.defense_id {
                return Err(CoreError::Internal(
                    "Finalizer evaluation targets a different defense".into(),
                ));
            }
        }

        let now = Utc::now();
        if let Some(evaluation) = &input.evaluation {
            tables.apply_evaluation(evaluation, now)?;
        }

        let record_id = tables.next_id();
        let defense = tables.open_defense_mut(input.defense_id)?;
        let record = FinalizationRecord {
            id: record_id,
            defense_id: input.defense_id,
            finalized_by: input.finalized_by,
            finalizer_role: input.finalizer_role,
            final_status: input.final_status,
            comments: input.comments.clone(),
            finalized_at: now,
        };
        defense.status = input.final_status;
        defense.finalization = Some(record.clone());
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    async fn seeded() -> (InMemoryDefenseStore, Proposal, Defense) {
        let store = InMemoryDefenseStore::new();
        let proposal = store
            .insert_proposal(NewProposal {
                student_id: 1,
                title: "Tesis".into(),
                career: "Sistemas".into(),
                status: ProposalStatus::Aprobada,
            })
            .await;
        let defense = store
            .insert_defense(proposal.id, DefenseKind::Privada, DefenseStatus::Programada)
            .await
            .unwrap();
        (store, proposal, defense)
    }

    fn upsert(defense_id: DbId, evaluator_id: DbId, grade: f64) -> UpsertEvaluation {
        UpsertEvaluation {
            defense_id,
            evaluator_id,
            evaluator_role: EvaluatorRole::Jurado,
            grade,
            comment: format!("nota {grade}"),
        }
    }

    #[tokio::test]
    async fn upsert_replaces_existing_evaluation() {
        let (store, _, defense) = seeded().await;
        let first = store.upsert_evaluation(&upsert(defense.id, 9, 6.0)).await.unwrap();
        let second = store.upsert_evaluation(&upsert(defense.id, 9, 7.5)).await.unwrap();

        assert_eq!(first.id, second.id);
        let stored = store.find_defense(defense.id).await.unwrap().unwrap();
        assert_eq!(stored.evaluations.len(), 1);
        assert_eq!(stored.evaluations[0].grade, 7.5);
        assert_eq!(stored.evaluations[0].comment, "nota 7.5");
    }

    #[tokio::test]
    async fn upsert_on_unknown_defense_is_not_found() {
        let store = InMemoryDefenseStore::new();
        let err = store.upsert_evaluation(&upsert(404, 9, 6.0)).await.unwrap_err();
        assert_matches!(err, CoreError::NotFound { entity: "Defense", id: 404 });
    }

    #[tokio::test]
    async fn finalize_writes_grade_record_and_status_together() {
        let (store, _, defense) = seeded().await;
        let input = FinalizeDefense {
            defense_id: defense.id,
            finalized_by: 50,
            finalizer_role: EvaluatorRole::Director,
            final_status: DefenseStatus::Aprobada,
            comments: "Aprobado".into(),
            evaluation: Some(UpsertEvaluation {
                evaluator_role: EvaluatorRole::Director,
                ..upsert(defense.id, 50, 9.0)
            }),
        };
        let record = store.finalize_defense(&input).await.unwrap();

        let stored = store.find_defense(defense.id).await.unwrap().unwrap();
        assert_eq!(stored.status, DefenseStatus::Aprobada);
        assert_eq!(stored.finalization, Some(record));
        assert_eq!(stored.evaluations.len(), 1);
        assert_eq!(stored.evaluations[0].evaluator_id, 50);
    }

    #[tokio::test]
    async fn finalized_defense_rejects_further_writes() {
        let (store, _, defense) = seeded().await;
        let input = FinalizeDefense {
            defense_id: defense.id,
            finalized_by: 50,
            finalizer_role: EvaluatorRole::Coordinador,
            final_status: DefenseStatus::Rechazada,
            comments: "No cumple".into(),
            evaluation: None,
        };
        store.finalize_defense(&input).await.unwrap();

        assert_matches!(
            store.finalize_defense(&input).await,
            Err(CoreError::Conflict(_))
        );
        assert_matches!(
            store.upsert_evaluation(&upsert(defense.id, 9, 5.0)).await,
            Err(CoreError::Conflict(_))
        );
    }

    #[tokio::test]
    async fn terminal_status_without_record_rejects_writes() {
        let (store, _, defense) = seeded().await;
        store
            .set_defense_status(defense.id, DefenseStatus::Rechazada)
            .await
            .unwrap();

        let err = store.upsert_evaluation(&upsert(defense.id, 9, 6.0)).await.unwrap_err();
        assert_matches!(err, CoreError::Conflict(msg) if msg.contains("RECHAZADA"));

        let finalize = FinalizeDefense {
            defense_id: defense.id,
            finalized_by: 50,
            finalizer_role: EvaluatorRole::Director,
            final_status: DefenseStatus::Aprobada,
            comments: "Aprobado".into(),
            evaluation: None,
        };
        let err = store.finalize_defense(&finalize).await.unwrap_err();
        assert_matches!(err, CoreError::Conflict(_));

        let stored = store.find_defense(defense.id).await.unwrap().unwrap();
        assert!(stored.evaluations.is_empty());
        assert!(stored.finalization.is_none());
        assert_eq!(stored.status, DefenseStatus::Rechazada);
    }

    #[tokio::test]
    async fn new_deliverable_supersedes_previous_version() {
        let (store, proposal, _) = seeded().await;
        let upload = |name: &str| NewDeliverable {
            proposal_id: proposal.id,
            kind: DeliverableKind::Tesis,
            file_name: name.into(),
        };
        store.add_deliverable(upload("v1.pdf")).await.unwrap();
        let v2 = store.add_deliverable(upload("v2.pdf")).await.unwrap();

        let bundle = store.find_proposal(proposal.id).await.unwrap().unwrap();
        assert_eq!(bundle.deliverables.len(), 2);
        let active: Vec<_> = bundle.deliverables.iter().filter(|d| d.is_active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, v2.id);
    }

    #[tokio::test]
    async fn only_eligible_proposals_are_listed() {
        let (store, approved, _) = seeded().await;
        store
            .insert_proposal(NewProposal {
                student_id: 2,
                title: "Pendiente".into(),
                career: "Sistemas".into(),
                status: ProposalStatus::Pendiente,
            })
            .await;

        let listed = store.list_eligible_proposals().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].proposal.id, approved.id);
        assert_eq!(listed[0].defenses.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_defense_kind_is_a_conflict() {
        let (store, proposal, _) = seeded().await;
        assert_matches!(
            store
                .insert_defense(proposal.id, DefenseKind::Privada, DefenseStatus::Pendiente)
                .await,
            Err(CoreError::Conflict(_))
        );
    }

    #[tokio::test]
    async fn evaluator_listing_covers_roster_and_graders() {
        let (store, _, defense) = seeded().await;
        store
            .assign_participant(defense.id, 11, EvaluatorRole::Jurado)
            .await
            .unwrap();
        store.upsert_evaluation(&upsert(defense.id, 12, 8.0)).await.unwrap();

        assert_eq!(store.list_defenses_for_evaluator(11).await.unwrap().len(), 1);
        assert_eq!(store.list_defenses_for_evaluator(12).await.unwrap().len(), 1);
        assert!(store.list_defenses_for_evaluator(13).await.unwrap().is_empty());
    }
}
