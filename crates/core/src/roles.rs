//! Evaluator roles and the capability checks derived from them.
//!
//! Role names must match the `role` claim issued by the identity provider
//! and the CHECK constraints in the `defense_participants` migration.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::defense::DefenseStatus;
use crate::error::CoreError;

pub const ROLE_JURADO: &str = "JURADO";
pub const ROLE_TUTOR: &str = "TUTOR";
pub const ROLE_DIRECTOR: &str = "DIRECTOR";
pub const ROLE_COORDINADOR: &str = "COORDINADOR";

/// All valid role names.
pub const VALID_ROLES: &[&str] = &[ROLE_JURADO, ROLE_TUTOR, ROLE_DIRECTOR, ROLE_COORDINADOR];

/// The role a participant plays when evaluating a defense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EvaluatorRole {
    Jurado,
    Tutor,
    Director,
    Coordinador,
}

impl EvaluatorRole {
    /// Parse a role name. Matching is case-insensitive because identity
    /// providers are inconsistent about casing.
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s.to_ascii_uppercase().as_str() {
            ROLE_JURADO => Ok(Self::Jurado),
            ROLE_TUTOR => Ok(Self::Tutor),
            ROLE_DIRECTOR => Ok(Self::Director),
            ROLE_COORDINADOR => Ok(Self::Coordinador),
            _ => Err(CoreError::Validation(format!(
                "Invalid role '{s}'. Must be one of: {}",
                VALID_ROLES.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Jurado => ROLE_JURADO,
            Self::Tutor => ROLE_TUTOR,
            Self::Director => ROLE_DIRECTOR,
            Self::Coordinador => ROLE_COORDINADOR,
        }
    }

    /// Jury members and tutors grade but never decide the outcome.
    pub fn is_jury(&self) -> bool {
        matches!(self, Self::Jurado | Self::Tutor)
    }
}

/// Whether `role` may finalize a defense.
pub fn can_finalize(role: EvaluatorRole) -> bool {
    matches!(role, EvaluatorRole::Director | EvaluatorRole::Coordinador)
}

/// An intent the presentation layer may dispatch for a defense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionKind {
    Grade,
    Approve,
    Reject,
    ApproveWithComments,
}

impl ActionKind {
    /// The defense status a finalizing action produces. `Grade` never
    /// changes status.
    pub fn final_status(&self) -> Option<DefenseStatus> {
        match self {
            Self::Grade => None,
            Self::Approve => Some(DefenseStatus::Aprobada),
            Self::Reject => Some(DefenseStatus::Rechazada),
            Self::ApproveWithComments => Some(DefenseStatus::AprobadaConComentarios),
        }
    }
}

/// The set of actions offered to `role`.
///
/// Directors and coordinators decide the outcome (their grade travels with
/// the decision); jury members and tutors can only submit a grade.
pub fn allowed_actions(role: EvaluatorRole) -> BTreeSet<ActionKind> {
    if can_finalize(role) {
        BTreeSet::from([
            ActionKind::Approve,
            ActionKind::Reject,
            ActionKind::ApproveWithComments,
        ])
    } else {
        BTreeSet::from([ActionKind::Grade])
    }
}
