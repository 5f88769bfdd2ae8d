//! Defense workflow engine.
//!
//! Validates every state-changing intent against a defense and applies it
//! through the [`DefenseStore`]. All preconditions (role, input, existence,
//! open/locked state) are checked before the store is asked to write, so a
//! rejected call never leaves partial state behind.
//!
//! ```text
//! PENDIENTE -> PROGRAMADA -> REALIZADA     (scheduling flow, external)
//!      \            |            /
//!       +-- grade() any number of times --+
//!                     |
//!          finalize() by DIRECTOR | COORDINADOR
//!                     |
//!  APROBADA | RECHAZADA | APROBADA_CON_COMENTARIOS   (terminal)
//! ```
//!
//! The engine never retries. Each store call is bounded by a timeout that
//! surfaces as [`CoreError::Store`].

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::aggregator::{self, EvaluatorDefenseView};
use crate::defense::{
    is_reachable, Defense, DefenseKind, DefenseStatus, FinalizationRecord, ParticipantEvaluation,
};
use crate::error::CoreError;
use crate::grading::{validate_comment, validate_grade};
use crate::proposal::EligibleProposal;
use crate::readiness::{readiness, ReadinessReport};
use crate::roles::{can_finalize, EvaluatorRole};
use crate::store::{DefenseStore, FinalizeDefense, StoreResult, UpsertEvaluation};
use crate::types::DbId;

/// Default bound on a single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// A grade submission.
#[derive(Debug, Clone)]
pub struct GradeInput {
    pub defense_id: DbId,
    pub evaluator_id: DbId,
    pub evaluator_role: EvaluatorRole,
    pub grade: f64,
    pub comment: String,
}

/// A finalization decision. When `grade` is present the finalizer's own
/// evaluation is written together with the decision, using `comments` as
/// the evaluation comment.
#[derive(Debug, Clone)]
pub struct FinalizeInput {
    pub defense_id: DbId,
    pub finalizer_id: DbId,
    pub finalizer_role: EvaluatorRole,
    pub final_status: DefenseStatus,
    pub grade: Option<f64>,
    pub comments: String,
}

/// The workflow engine. Cheap to clone; share one per process.
#[derive(Clone)]
pub struct DefenseWorkflow {
    store: Arc<dyn DefenseStore>,
    store_timeout: Duration,
}

impl DefenseWorkflow {
    pub fn new(store: Arc<dyn DefenseStore>) -> Self {
        Self {
            store,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }

    pub fn with_store_timeout(mut self, timeout: Duration) -> Self {
        self.store_timeout = timeout;
        self
    }

    pub fn store_timeout(&self) -> Duration {
        self.store_timeout
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = StoreResult<T>>,
    ) -> Result<T, CoreError> {
        match tokio::time::timeout(self.store_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(CoreError::Store(format!(
                "{operation} timed out after {}ms",
                self.store_timeout.as_millis()
            ))),
        }
    }

    // -- Reads ---------------------------------------------------------------

    /// Load a defense or fail with `NotFound`.
    pub async fn defense(&self, defense_id: DbId) -> Result<Defense, CoreError> {
        self.bounded("find_defense", self.store.find_defense(defense_id))
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Defense",
                id: defense_id,
            })
    }

    /// Whether `defense` can currently be worked on (private → public gate).
    pub async fn is_reachable(&self, defense: &Defense) -> Result<bool, CoreError> {
        let private_status = match defense.kind {
            DefenseKind::Privada => Some(defense.status),
            DefenseKind::Publica => self
                .bounded(
                    "find_defense_for_proposal",
                    self.store
                        .find_defense_for_proposal(defense.proposal_id, DefenseKind::Privada),
                )
                .await?
                .map(|d| d.status),
        };
        Ok(is_reachable(defense.kind, private_status))
    }

    /// The caller's own evaluation, used to pre-fill the grading form.
    pub async fn my_evaluation(
        &self,
        defense_id: DbId,
        evaluator_id: DbId,
    ) -> Result<Option<ParticipantEvaluation>, CoreError> {
        let defense = self.defense(defense_id).await?;
        Ok(aggregator::find_evaluation(&defense, evaluator_id).cloned())
    }

    /// Jury and tutor evaluations in submission order. An unknown defense
    /// simply has no comments yet.
    pub async fn jury_comments(
        &self,
        defense_id: DbId,
    ) -> Result<Vec<ParticipantEvaluation>, CoreError> {
        let defense = self
            .bounded("find_defense", self.store.find_defense(defense_id))
            .await?;
        Ok(defense
            .map(|d| aggregator::jury_comments(&d))
            .unwrap_or_default())
    }

    /// Approved proposals with their readiness and defense summaries.
    pub async fn eligible_proposals(&self) -> Result<Vec<EligibleProposal>, CoreError> {
        let bundles = self
            .bounded(
                "list_eligible_proposals",
                self.store.list_eligible_proposals(),
            )
            .await?;
        Ok(bundles
            .into_iter()
            .filter(|b| b.proposal.status.is_eligible_for_defense())
            .map(EligibleProposal::from_bundle)
            .collect())
    }

    /// Document readiness for one proposal.
    pub async fn proposal_readiness(&self, proposal_id: DbId) -> Result<ReadinessReport, CoreError> {
        let bundle = self
            .bounded("find_proposal", self.store.find_proposal(proposal_id))
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Proposal",
                id: proposal_id,
            })?;
        Ok(readiness(&bundle.deliverables))
    }

    /// Every defense the evaluator takes part in, with their own role,
    /// grade and comment.
    pub async fn defenses_for_evaluator(
        &self,
        evaluator_id: DbId,
    ) -> Result<Vec<EvaluatorDefenseView>, CoreError> {
        let defenses = self
            .bounded(
                "list_defenses_for_evaluator",
                self.store.list_defenses_for_evaluator(evaluator_id),
            )
            .await?;

        let mut views = Vec::with_capacity(defenses.len());
        for defense in &defenses {
            let reachable = self.is_reachable(defense).await?;
            views.push(EvaluatorDefenseView::new(defense, evaluator_id, reachable));
        }
        Ok(views)
    }

    // -- Writes --------------------------------------------------------------

    /// Reject writes on finalized or locked defenses.
    async fn ensure_open(&self, defense: &Defense) -> Result<(), CoreError> {
        if defense.is_finalized() {
            return Err(CoreError::Conflict(format!(
                "Defense {} has already been finalized as {}",
                defense.id,
                defense.status.as_str()
            )));
        }
        if !self.is_reachable(defense).await? {
            return Err(CoreError::Conflict(format!(
                "Defense {} is locked until the private defense is approved",
                defense.id
            )));
        }
        Ok(())
    }

    /// Record (or replace) an evaluator's grade. Any role may grade; the
    /// defense status does not change.
    pub async fn grade(&self, input: GradeInput) -> Result<ParticipantEvaluation, CoreError> {
        let grade = validate_grade(input.grade)?;
        validate_comment("comment", &input.comment)?;

        let defense = self.defense(input.defense_id).await?;
        self.ensure_open(&defense).await?;

        let upsert = UpsertEvaluation {
            defense_id: input.defense_id,
            evaluator_id: input.evaluator_id,
            evaluator_role: input.evaluator_role,
            grade,
            comment: input.comment,
        };
        self.bounded("upsert_evaluation", self.store.upsert_evaluation(&upsert))
            .await
    }

    /// Grade submission for jury members and tutors. Same validation as
    /// [`grade`](Self::grade); never moves the defense forward.
    pub async fn submit_jury_grade(
        &self,
        input: GradeInput,
    ) -> Result<ParticipantEvaluation, CoreError> {
        if !input.evaluator_role.is_jury() {
            return Err(CoreError::Forbidden(format!(
                "Role {} grades through finalization, not the jury grade submission",
                input.evaluator_role.as_str()
            )));
        }
        self.grade(input).await
    }

    /// Decide the outcome of a defense. Only directors and coordinators may
    /// finalize; the decision is terminal.
    pub async fn finalize(&self, input: FinalizeInput) -> Result<FinalizationRecord, CoreError> {
        if !can_finalize(input.finalizer_role) {
            return Err(CoreError::Forbidden(format!(
                "Role {} cannot finalize a defense",
                input.finalizer_role.as_str()
            )));
        }
        if !input.final_status.is_final_outcome() {
            return Err(CoreError::invalid_field(
                "status",
                format!(
                    "Status {} is not a final outcome. Must be one of: APROBADA, RECHAZADA, APROBADA_CON_COMENTARIOS",
                    input.final_status.as_str()
                ),
            ));
        }
        validate_comment("comments", &input.comments)?;
        let grade = input.grade.map(validate_grade).transpose()?;

        let defense = self.defense(input.defense_id).await?;
        self.ensure_open(&defense).await?;

        let finalize = FinalizeDefense {
            defense_id: input.defense_id,
            finalized_by: input.finalizer_id,
            finalizer_role: input.finalizer_role,
            final_status: input.final_status,
            evaluation: grade.map(|grade| UpsertEvaluation {
                defense_id: input.defense_id,
                evaluator_id: input.finalizer_id,
                evaluator_role: input.finalizer_role,
                grade,
                comment: input.comments.clone(),
            }),
            comments: input.comments,
        };
        self.bounded("finalize_defense", self.store.finalize_defense(&finalize))
            .await
    }
}
