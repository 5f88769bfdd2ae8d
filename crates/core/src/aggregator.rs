//! Read-side views over a defense's evaluations.
//!
//! There is no statistical combination here: directors read the individual
//! jury grades and comments and supply their own decision.

use serde::Serialize;

use crate::defense::{Defense, DefenseSummary, ParticipantEvaluation};
use crate::roles::EvaluatorRole;
use crate::types::{DbId, Timestamp};

/// The caller's own evaluation on `defense`, if they have graded it.
pub fn find_evaluation(defense: &Defense, evaluator_id: DbId) -> Option<&ParticipantEvaluation> {
    defense
        .evaluations
        .iter()
        .find(|e| e.evaluator_id == evaluator_id)
}

/// Jury and tutor evaluations, oldest submission first.
pub fn jury_comments(defense: &Defense) -> Vec<ParticipantEvaluation> {
    let mut comments: Vec<ParticipantEvaluation> = defense
        .evaluations
        .iter()
        .filter(|e| e.evaluator_role.is_jury())
        .cloned()
        .collect();
    comments.sort_by_key(|e| (e.graded_at, e.id));
    comments
}

/// Counts shown next to a defense in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GradeSummary {
    pub jury_grades: usize,
    pub total_evaluations: usize,
    pub graded_by_caller: bool,
}

pub fn summarize(defense: &Defense, evaluator_id: DbId) -> GradeSummary {
    GradeSummary {
        jury_grades: defense
            .evaluations
            .iter()
            .filter(|e| e.evaluator_role.is_jury())
            .count(),
        total_evaluations: defense.evaluations.len(),
        graded_by_caller: find_evaluation(defense, evaluator_id).is_some(),
    }
}

/// One row of the "defenses I evaluate" listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluatorDefenseView {
    #[serde(flatten)]
    pub defense: DefenseSummary,
    pub proposal_id: DbId,
    pub my_role: Option<EvaluatorRole>,
    pub my_grade: Option<f64>,
    pub my_comment: Option<String>,
    pub graded_at: Option<Timestamp>,
    pub grades: GradeSummary,
}

impl EvaluatorDefenseView {
    pub fn new(defense: &Defense, evaluator_id: DbId, reachable: bool) -> Self {
        let mine = find_evaluation(defense, evaluator_id);
        Self {
            defense: DefenseSummary::new(defense, reachable),
            proposal_id: defense.proposal_id,
            my_role: defense.role_of(evaluator_id),
            my_grade: mine.map(|e| e.grade),
            my_comment: mine.map(|e| e.comment.clone()),
            graded_at: mine.map(|e| e.graded_at),
            grades: summarize(defense, evaluator_id),
        }
    }
}
