//! Thesis proposals and the listing view served to evaluators.

use serde::{Deserialize, Serialize};

use crate::defense::{is_reachable, Defense, DefenseKind, DefenseSummary};
use crate::error::CoreError;
use crate::readiness::{readiness, Deliverable, ReadinessReport};
use crate::types::{DbId, Timestamp};

pub const PROPOSAL_APROBADA: &str = "APROBADA";
pub const PROPOSAL_APROBADA_CON_COMENTARIOS: &str = "APROBADA_CON_COMENTARIOS";
pub const PROPOSAL_PENDIENTE: &str = "PENDIENTE";
pub const PROPOSAL_RECHAZADA: &str = "RECHAZADA";

/// All valid proposal status values.
pub const VALID_PROPOSAL_STATUSES: &[&str] = &[
    PROPOSAL_APROBADA,
    PROPOSAL_APROBADA_CON_COMENTARIOS,
    PROPOSAL_PENDIENTE,
    PROPOSAL_RECHAZADA,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProposalStatus {
    Aprobada,
    AprobadaConComentarios,
    Pendiente,
    Rechazada,
}

impl ProposalStatus {
    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            PROPOSAL_APROBADA => Ok(Self::Aprobada),
            PROPOSAL_APROBADA_CON_COMENTARIOS => Ok(Self::AprobadaConComentarios),
            PROPOSAL_PENDIENTE => Ok(Self::Pendiente),
            PROPOSAL_RECHAZADA => Ok(Self::Rechazada),
            _ => Err(CoreError::Validation(format!(
                "Invalid proposal status '{s}'. Must be one of: {}",
                VALID_PROPOSAL_STATUSES.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aprobada => PROPOSAL_APROBADA,
            Self::AprobadaConComentarios => PROPOSAL_APROBADA_CON_COMENTARIOS,
            Self::Pendiente => PROPOSAL_PENDIENTE,
            Self::Rechazada => PROPOSAL_RECHAZADA,
        }
    }

    /// Only approved proposals go on to their defenses.
    pub fn is_eligible_for_defense(&self) -> bool {
        matches!(self, Self::Aprobada | Self::AprobadaConComentarios)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: DbId,
    pub student_id: DbId,
    pub title: String,
    pub career: String,
    pub status: ProposalStatus,
    pub created_at: Timestamp,
}

/// A proposal loaded together with its deliverables and defenses.
#[derive(Debug, Clone, PartialEq)]
pub struct ProposalBundle {
    pub proposal: Proposal,
    pub deliverables: Vec<Deliverable>,
    pub defenses: Vec<Defense>,
}

impl ProposalBundle {
    pub fn defense(&self, kind: DefenseKind) -> Option<&Defense> {
        self.defenses.iter().find(|d| d.kind == kind)
    }
}

/// Listing entry for an approved proposal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibleProposal {
    #[serde(flatten)]
    pub proposal: Proposal,
    pub deliverables: Vec<Deliverable>,
    pub readiness: ReadinessReport,
    pub private_defense: Option<DefenseSummary>,
    pub public_defense: Option<DefenseSummary>,
}

impl EligibleProposal {
    pub fn from_bundle(bundle: ProposalBundle) -> Self {
        let private_status = bundle.defense(DefenseKind::Privada).map(|d| d.status);
        let summary = |kind: DefenseKind| {
            bundle
                .defense(kind)
                .map(|d| DefenseSummary::new(d, is_reachable(kind, private_status)))
        };
        let private_defense = summary(DefenseKind::Privada);
        let public_defense = summary(DefenseKind::Publica);
        let readiness = readiness(&bundle.deliverables);

        Self {
            proposal: bundle.proposal,
            deliverables: bundle.deliverables,
            readiness,
            private_defense,
            public_defense,
        }
    }
}
