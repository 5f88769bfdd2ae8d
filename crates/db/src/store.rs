//! PostgreSQL implementation of [`DefenseStore`].
//!
//! Writes lock the defense row (`SELECT ... FOR UPDATE`) for the length of
//! their transaction, so concurrent grades and a finalization on the same
//! defense apply one after another and a finalization can never interleave
//! with a late grade.

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};
use tesis_core::defense::{
    Defense, DefenseKind, DefenseParticipant, FinalizationRecord, ParticipantEvaluation,
};
use tesis_core::error::CoreError;
use tesis_core::proposal::{
    Proposal, ProposalBundle, PROPOSAL_APROBADA, PROPOSAL_APROBADA_CON_COMENTARIOS,
};
use tesis_core::readiness::Deliverable;
use tesis_core::store::{DefenseStore, FinalizeDefense, StoreResult, UpsertEvaluation};
use tesis_core::types::DbId;

use crate::models::defense::DefenseRow;
use crate::models::proposal::ProposalRow;
use crate::repositories::{
    DefenseRepo, DeliverableRepo, EvaluationRepo, FinalizationRepo, ProposalRepo,
};

/// Map a sqlx error onto the domain error taxonomy.
///
/// Unique violations on `uq_` constraints become `Conflict`; everything
/// else is a retryable store failure.
pub fn store_error(err: sqlx::Error) -> CoreError {
    if let sqlx::Error::Database(db_err) = &err {
        // PostgreSQL unique constraint violation: error code 23505
        if db_err.code().as_deref() == Some("23505") {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if constraint.starts_with("uq_") {
                return CoreError::Conflict(format!(
                    "Duplicate value violates unique constraint: {constraint}"
                ));
            }
        }
    }
    tracing::error!(error = %err, "Defense store query failed");
    CoreError::Store(err.to_string())
}

fn defense_not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Defense",
        id,
    }
}

/// Refuse writes on a defense that already carries a decision.
async fn ensure_open(conn: &mut PgConnection, row: &DefenseRow) -> StoreResult<()> {
    let status = row.parsed_status()?;
    let finalized = FinalizationRepo::exists_for_defense(conn, row.id)
        .await
        .map_err(store_error)?;
    if finalized || status.is_terminal() {
        return Err(CoreError::Conflict(format!(
            "Defense {} has already been finalized as {}",
            row.id,
            status.as_str()
        )));
    }
    Ok(())
}

pub struct PgDefenseStore {
    pool: PgPool,
}

impl PgDefenseStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Attach roster, evaluations and finalization to each defense row.
    async fn load_defenses(&self, rows: Vec<DefenseRow>) -> StoreResult<Vec<Defense>> {
        if rows.is_empty() {
            return Ok(vec![]);
        }
        let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();

        let mut participants: HashMap<DbId, Vec<DefenseParticipant>> = HashMap::new();
        for row in DefenseRepo::list_participants(&self.pool, &ids)
            .await
            .map_err(store_error)?
        {
            participants
                .entry(row.defense_id)
                .or_default()
                .push(DefenseParticipant::try_from(row)?);
        }

        let mut evaluations: HashMap<DbId, Vec<ParticipantEvaluation>> = HashMap::new();
        for row in EvaluationRepo::list_for_defenses(&self.pool, &ids)
            .await
            .map_err(store_error)?
        {
            evaluations
                .entry(row.defense_id)
                .or_default()
                .push(ParticipantEvaluation::try_from(row)?);
        }

        let mut finalizations: HashMap<DbId, FinalizationRecord> = HashMap::new();
        for row in FinalizationRepo::list_for_defenses(&self.pool, &ids)
            .await
            .map_err(store_error)?
        {
            finalizations.insert(row.defense_id, FinalizationRecord::try_from(row)?);
        }

        rows.into_iter()
            .map(|row| {
                let id = row.id;
                row.into_domain(
                    participants.remove(&id).unwrap_or_default(),
                    evaluations.remove(&id).unwrap_or_default(),
                    finalizations.remove(&id),
                )
            })
            .collect()
    }

    /// Attach deliverables and defenses to each proposal row.
    async fn load_bundles(&self, rows: Vec<ProposalRow>) -> StoreResult<Vec<ProposalBundle>> {
        if rows.is_empty() {
            return Ok(vec![]);
        }
        let ids: Vec<DbId> = rows.iter().map(|r| r.id).collect();

        let mut deliverables: HashMap<DbId, Vec<Deliverable>> = HashMap::new();
        for row in DeliverableRepo::list_for_proposals(&self.pool, &ids)
            .await
            .map_err(store_error)?
        {
            deliverables
                .entry(row.proposal_id)
                .or_default()
                .push(Deliverable::try_from(row)?);
        }

        let defense_rows = DefenseRepo::list_for_proposals(&self.pool, &ids)
            .await
            .map_err(store_error)?;
        let mut defenses: HashMap<DbId, Vec<Defense>> = HashMap::new();
        for defense in self.load_defenses(defense_rows).await? {
            defenses.entry(defense.proposal_id).or_default().push(defense);
        }

        rows.into_iter()
            .map(|row| {
                let id = row.id;
                Ok(ProposalBundle {
                    proposal: Proposal::try_from(row)?,
                    deliverables: deliverables.remove(&id).unwrap_or_default(),
                    defenses: defenses.remove(&id).unwrap_or_default(),
                })
            })
            .collect()
    }

    async fn load_defense(&self, row: Option<DefenseRow>) -> StoreResult<Option<Defense>> {
        match row {
            Some(row) => Ok(self.load_defenses(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl DefenseStore for PgDefenseStore {
    async fn list_eligible_proposals(&self) -> StoreResult<Vec<ProposalBundle>> {
        let rows = ProposalRepo::list_by_statuses(
            &self.pool,
            &[PROPOSAL_APROBADA, PROPOSAL_APROBADA_CON_COMENTARIOS],
        )
        .await
        .map_err(store_error)?;
        self.load_bundles(rows).await
    }

    async fn find_proposal(&self, proposal_id: DbId) -> StoreResult<Option<ProposalBundle>> {
        let Some(row) = ProposalRepo::find_by_id(&self.pool, proposal_id)
            .await
            .map_err(store_error)?
        else {
            return Ok(None);
        };
        Ok(self.load_bundles(vec![row]).await?.pop())
    }

    async fn find_defense(&self, defense_id: DbId) -> StoreResult<Option<Defense>> {
        let row = DefenseRepo::find_by_id(&self.pool, defense_id)
            .await
            .map_err(store_error)?;
        self.load_defense(row).await
    }

    async fn find_defense_for_proposal(
        &self,
        proposal_id: DbId,
        kind: DefenseKind,
    ) -> StoreResult<Option<Defense>> {
        let row = DefenseRepo::find_for_proposal(&self.pool, proposal_id, kind.as_str())
            .await
            .map_err(store_error)?;
        self.load_defense(row).await
    }

    async fn list_defenses_for_evaluator(&self, evaluator_id: DbId) -> StoreResult<Vec<Defense>> {
        let rows = DefenseRepo::list_for_evaluator(&self.pool, evaluator_id)
            .await
            .map_err(store_error)?;
        self.load_defenses(rows).await
    }

    async fn upsert_evaluation(
        &self,
        input: &UpsertEvaluation,
    ) -> StoreResult<ParticipantEvaluation> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        let defense = DefenseRepo::lock_for_update(&mut tx, input.defense_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| defense_not_found(input.defense_id))?;
        ensure_open(&mut tx, &defense).await?;

        let row = EvaluationRepo::upsert(&mut tx, input)
            .await
            .map_err(store_error)?;
        tx.commit().await.map_err(store_error)?;

        ParticipantEvaluation::try_from(row)
    }

    async fn finalize_defense(&self, input: &FinalizeDefense) -> StoreResult<FinalizationRecord> {
        let mut tx = self.pool.begin().await.map_err(store_error)?;

        let defense = DefenseRepo::lock_for_update(&mut tx, input.defense_id)
            .await
            .map_err(store_error)?
            .ok_or_else(|| defense_not_found(input.defense_id))?;
        ensure_open(&mut tx, &defense).await?;

        if let Some(evaluation) = &input.evaluation {
            EvaluationRepo::upsert(&mut tx, evaluation)
                .await
                .map_err(store_error)?;
        }
        let record = FinalizationRepo::insert(&mut tx, input)
            .await
            .map_err(store_error)?;
        DefenseRepo::update_status(&mut tx, input.defense_id, input.final_status.as_str())
            .await
            .map_err(store_error)?;

        tx.commit().await.map_err(store_error)?;
        tracing::debug!(
            defense_id = input.defense_id,
            final_status = input.final_status.as_str(),
            "Defense finalization committed"
        );

        FinalizationRecord::try_from(record)
    }
}
