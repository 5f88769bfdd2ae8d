//! Defense entities, statuses and the private → public gating rule.
//!
//! Every approved proposal has two defenses: a private one and a public
//! one. The public defense stays locked until the private defense has
//! passed. "Locked" is never stored; it is derived from the private
//! defense's status through [`is_reachable`].

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::roles::EvaluatorRole;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const KIND_PRIVADA: &str = "PRIVADA";
pub const KIND_PUBLICA: &str = "PUBLICA";

pub const STATUS_PENDIENTE: &str = "PENDIENTE";
pub const STATUS_PROGRAMADA: &str = "PROGRAMADA";
pub const STATUS_REALIZADA: &str = "REALIZADA";
pub const STATUS_APROBADA: &str = "APROBADA";
pub const STATUS_RECHAZADA: &str = "RECHAZADA";
pub const STATUS_APROBADA_CON_COMENTARIOS: &str = "APROBADA_CON_COMENTARIOS";

/// All valid defense status values.
pub const VALID_DEFENSE_STATUSES: &[&str] = &[
    STATUS_PENDIENTE,
    STATUS_PROGRAMADA,
    STATUS_REALIZADA,
    STATUS_APROBADA,
    STATUS_RECHAZADA,
    STATUS_APROBADA_CON_COMENTARIOS,
];

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which of the two defenses of a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DefenseKind {
    Privada,
    Publica,
}

impl DefenseKind {
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s.to_ascii_uppercase().as_str() {
            KIND_PRIVADA => Ok(Self::Privada),
            KIND_PUBLICA => Ok(Self::Publica),
            _ => Err(CoreError::Validation(format!(
                "Invalid defense kind '{s}'. Must be one of: {KIND_PRIVADA}, {KIND_PUBLICA}"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Privada => KIND_PRIVADA,
            Self::Publica => KIND_PUBLICA,
        }
    }

    /// Lower-case form used in URL paths (`/defenses/privada/{id}`).
    pub fn path_segment(&self) -> &'static str {
        match self {
            Self::Privada => "privada",
            Self::Publica => "publica",
        }
    }
}

/// Lifecycle status of a single defense.
///
/// ```text
/// PENDIENTE -> PROGRAMADA -> REALIZADA        (scheduling flow)
///     any non-terminal -> APROBADA | RECHAZADA | APROBADA_CON_COMENTARIOS
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DefenseStatus {
    Pendiente,
    Programada,
    Realizada,
    Aprobada,
    Rechazada,
    AprobadaConComentarios,
}

impl DefenseStatus {
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            STATUS_PENDIENTE => Ok(Self::Pendiente),
            STATUS_PROGRAMADA => Ok(Self::Programada),
            STATUS_REALIZADA => Ok(Self::Realizada),
            STATUS_APROBADA => Ok(Self::Aprobada),
            STATUS_RECHAZADA => Ok(Self::Rechazada),
            STATUS_APROBADA_CON_COMENTARIOS => Ok(Self::AprobadaConComentarios),
            _ => Err(CoreError::Validation(format!(
                "Invalid defense status '{s}'. Must be one of: {}",
                VALID_DEFENSE_STATUSES.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pendiente => STATUS_PENDIENTE,
            Self::Programada => STATUS_PROGRAMADA,
            Self::Realizada => STATUS_REALIZADA,
            Self::Aprobada => STATUS_APROBADA,
            Self::Rechazada => STATUS_RECHAZADA,
            Self::AprobadaConComentarios => STATUS_APROBADA_CON_COMENTARIOS,
        }
    }

    /// Whether this status is one of the three outcomes a finalization may
    /// set. All of them are terminal.
    pub fn is_final_outcome(&self) -> bool {
        matches!(
            self,
            Self::Aprobada | Self::Rechazada | Self::AprobadaConComentarios
        )
    }

    pub fn is_terminal(&self) -> bool {
        self.is_final_outcome()
    }

    /// Whether a private defense in this status opens the public defense.
    pub fn unlocks_public_defense(&self) -> bool {
        matches!(self, Self::Aprobada | Self::AprobadaConComentarios)
    }
}

/// Whether a defense of `kind` can be worked on, given the status of the
/// same proposal's private defense (if one exists).
pub fn is_reachable(kind: DefenseKind, private_status: Option<DefenseStatus>) -> bool {
    match kind {
        DefenseKind::Privada => true,
        DefenseKind::Publica => private_status.is_some_and(|s| s.unlocks_public_defense()),
    }
}

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// An evaluator assigned to a defense by the scheduling flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenseParticipant {
    pub evaluator_id: DbId,
    pub role: EvaluatorRole,
}

/// One evaluator's grade and comment for one defense. At most one exists
/// per (defense, evaluator) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantEvaluation {
    pub id: DbId,
    pub defense_id: DbId,
    pub evaluator_id: DbId,
    pub evaluator_role: EvaluatorRole,
    pub grade: f64,
    pub comment: String,
    pub graded_at: Timestamp,
}

/// The terminal decision on a defense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizationRecord {
    pub id: DbId,
    pub defense_id: DbId,
    pub finalized_by: DbId,
    pub finalizer_role: EvaluatorRole,
    pub final_status: DefenseStatus,
    pub comments: String,
    pub finalized_at: Timestamp,
}

/// A defense with its roster, evaluations and (once decided) finalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defense {
    pub id: DbId,
    pub proposal_id: DbId,
    pub kind: DefenseKind,
    pub status: DefenseStatus,
    pub scheduled_at: Option<Timestamp>,
    pub room: Option<String>,
    pub participants: Vec<DefenseParticipant>,
    pub evaluations: Vec<ParticipantEvaluation>,
    pub finalization: Option<FinalizationRecord>,
}

impl Defense {
    /// A defense is closed once it has a finalization record or its status
    /// is already terminal.
    pub fn is_finalized(&self) -> bool {
        self.finalization.is_some() || self.status.is_terminal()
    }

    /// The role `evaluator_id` plays on this defense: the assigned role if
    /// rostered, otherwise the role of their evaluation if they graded.
    pub fn role_of(&self, evaluator_id: DbId) -> Option<EvaluatorRole> {
        self.participants
            .iter()
            .find(|p| p.evaluator_id == evaluator_id)
            .map(|p| p.role)
            .or_else(|| {
                self.evaluations
                    .iter()
                    .find(|e| e.evaluator_id == evaluator_id)
                    .map(|e| e.evaluator_role)
            })
    }

    /// Whether `evaluator_id` is rostered on or has graded this defense.
    pub fn involves(&self, evaluator_id: DbId) -> bool {
        self.role_of(evaluator_id).is_some()
    }
}

/// Compact defense view embedded in proposal listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefenseSummary {
    pub id: DbId,
    pub kind: DefenseKind,
    pub status: DefenseStatus,
    pub scheduled_at: Option<Timestamp>,
    pub room: Option<String>,
    pub reachable: bool,
    pub locked: bool,
    pub evaluation_count: usize,
    pub finalized: bool,
}

impl DefenseSummary {
    pub fn new(defense: &Defense, reachable: bool) -> Self {
        Self {
            id: defense.id,
            kind: defense.kind,
            status: defense.status,
            scheduled_at: defense.scheduled_at,
            room: defense.room.clone(),
            reachable,
            locked: !reachable,
            evaluation_count: defense.evaluations.len(),
            finalized: defense.is_finalized(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn defense(kind: DefenseKind, status: DefenseStatus) -> Defense {
        Defense {
            id: 1,
            proposal_id: 10,
            kind,
            status,
            scheduled_at: None,
            room: None,
            participants: vec![DefenseParticipant {
                evaluator_id: 100,
                role: EvaluatorRole::Jurado,
            }],
            evaluations: vec![],
            finalization: None,
        }
    }

    #[test]
    fn status_round_trip() {
        for s in VALID_DEFENSE_STATUSES {
            assert_eq!(DefenseStatus::from_str_value(s).unwrap().as_str(), *s);
        }
    }

    #[test]
    fn status_from_str_invalid() {
        let err = DefenseStatus::from_str_value("CANCELADA").unwrap_err();
        assert!(err.to_string().contains("Invalid defense status"));
    }

    #[test]
    fn status_serializes_with_underscores() {
        let json = serde_json::to_string(&DefenseStatus::AprobadaConComentarios).unwrap();
        assert_eq!(json, "\"APROBADA_CON_COMENTARIOS\"");
    }

    #[test]
    fn only_three_outcomes_are_final() {
        assert!(DefenseStatus::Aprobada.is_final_outcome());
        assert!(DefenseStatus::Rechazada.is_final_outcome());
        assert!(DefenseStatus::AprobadaConComentarios.is_final_outcome());
        assert!(!DefenseStatus::Pendiente.is_final_outcome());
        assert!(!DefenseStatus::Programada.is_final_outcome());
        assert!(!DefenseStatus::Realizada.is_final_outcome());
    }

    #[test]
    fn kind_parses_path_segments() {
        assert_eq!(
            DefenseKind::from_str_value("privada").unwrap(),
            DefenseKind::Privada
        );
        assert_eq!(
            DefenseKind::from_str_value("PUBLICA").unwrap(),
            DefenseKind::Publica
        );
        assert!(DefenseKind::from_str_value("oral").is_err());
        assert_eq!(DefenseKind::Publica.path_segment(), "publica");
    }

    #[test]
    fn private_defense_is_always_reachable() {
        assert!(is_reachable(DefenseKind::Privada, None));
        assert!(is_reachable(
            DefenseKind::Privada,
            Some(DefenseStatus::Rechazada)
        ));
    }

    #[test]
    fn public_defense_requires_passed_private() {
        assert!(!is_reachable(DefenseKind::Publica, None));
        assert!(!is_reachable(
            DefenseKind::Publica,
            Some(DefenseStatus::Programada)
        ));
        assert!(!is_reachable(
            DefenseKind::Publica,
            Some(DefenseStatus::Rechazada)
        ));
        assert!(is_reachable(
            DefenseKind::Publica,
            Some(DefenseStatus::Aprobada)
        ));
        assert!(is_reachable(
            DefenseKind::Publica,
            Some(DefenseStatus::AprobadaConComentarios)
        ));
    }

    #[test]
    fn role_of_prefers_roster_then_evaluations() {
        let mut d = defense(DefenseKind::Privada, DefenseStatus::Programada);
        assert_eq!(d.role_of(100), Some(EvaluatorRole::Jurado));
        assert_eq!(d.role_of(200), None);

        d.evaluations.push(ParticipantEvaluation {
            id: 5,
            defense_id: 1,
            evaluator_id: 200,
            evaluator_role: EvaluatorRole::Director,
            grade: 9.0,
            comment: "Bien".into(),
            graded_at: chrono::Utc::now(),
        });
        assert_eq!(d.role_of(200), Some(EvaluatorRole::Director));
        assert!(d.involves(200));
    }

    #[test]
    fn summary_marks_locked_defenses() {
        let d = defense(DefenseKind::Publica, DefenseStatus::Pendiente);
        let summary = DefenseSummary::new(&d, false);
        assert!(summary.locked);
        assert!(!summary.reachable);
        assert!(!summary.finalized);
    }

    #[test]
    fn terminal_status_counts_as_finalized() {
        let d = defense(DefenseKind::Privada, DefenseStatus::Rechazada);
        assert!(d.is_finalized());
    }
}
