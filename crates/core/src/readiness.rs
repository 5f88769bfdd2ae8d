//! Document readiness gate for defense grading.
//!
//! A proposal must carry three final deliverables before its defense can be
//! graded with all documents at hand: the thesis, the user manual and the
//! scientific article. Only the active version of each kind counts. The
//! gate reports availability; it never blocks an operation by itself.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const DELIVERABLE_TESIS: &str = "TESIS";
pub const DELIVERABLE_MANUAL_USUARIO: &str = "MANUAL_USUARIO";
pub const DELIVERABLE_ARTICULO: &str = "ARTICULO";

/// All valid deliverable kinds.
pub const VALID_DELIVERABLE_KINDS: &[&str] = &[
    DELIVERABLE_TESIS,
    DELIVERABLE_MANUAL_USUARIO,
    DELIVERABLE_ARTICULO,
];

/// Number of deliverable kinds a complete proposal carries.
pub const REQUIRED_DELIVERABLES: u8 = 3;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeliverableKind {
    Tesis,
    ManualUsuario,
    Articulo,
}

impl DeliverableKind {
    pub const ALL: [DeliverableKind; 3] = [Self::Tesis, Self::ManualUsuario, Self::Articulo];

    pub fn from_str_value(s: &str) -> Result<Self, CoreError> {
        match s {
            DELIVERABLE_TESIS => Ok(Self::Tesis),
            DELIVERABLE_MANUAL_USUARIO => Ok(Self::ManualUsuario),
            DELIVERABLE_ARTICULO => Ok(Self::Articulo),
            _ => Err(CoreError::Validation(format!(
                "Invalid deliverable kind '{s}'. Must be one of: {}",
                VALID_DELIVERABLE_KINDS.join(", ")
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tesis => DELIVERABLE_TESIS,
            Self::ManualUsuario => DELIVERABLE_MANUAL_USUARIO,
            Self::Articulo => DELIVERABLE_ARTICULO,
        }
    }
}

/// One uploaded version of a deliverable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Deliverable {
    pub id: DbId,
    pub proposal_id: DbId,
    pub kind: DeliverableKind,
    pub file_name: String,
    /// Opaque key understood by the document store.
    pub storage_key: String,
    pub is_active: bool,
    pub uploaded_at: Timestamp,
}

/// How many of the required deliverables are present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Completeness {
    pub present: u8,
    pub required: u8,
}

impl Completeness {
    pub fn is_complete(&self) -> bool {
        self.present >= self.required
    }

    /// `"n/3"` form for display.
    pub fn label(&self) -> String {
        format!("{}/{}", self.present, self.required)
    }
}

/// Active deliverable per kind plus the completeness ratio.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadinessReport {
    pub tesis: Option<Deliverable>,
    pub user_manual: Option<Deliverable>,
    pub scientific_article: Option<Deliverable>,
    pub completeness: Completeness,
}

impl ReadinessReport {
    pub fn get(&self, kind: DeliverableKind) -> Option<&Deliverable> {
        match kind {
            DeliverableKind::Tesis => self.tesis.as_ref(),
            DeliverableKind::ManualUsuario => self.user_manual.as_ref(),
            DeliverableKind::Articulo => self.scientific_article.as_ref(),
        }
    }

    /// Whether the viewer may offer `kind` for selection.
    pub fn is_available(&self, kind: DeliverableKind) -> bool {
        self.get(kind).is_some()
    }
}

// ---------------------------------------------------------------------------
// Evaluation
// ---------------------------------------------------------------------------

/// Pick the active deliverable of `kind`. If several are flagged active the
/// most recently uploaded one wins.
fn active_of_kind(deliverables: &[Deliverable], kind: DeliverableKind) -> Option<Deliverable> {
    deliverables
        .iter()
        .filter(|d| d.kind == kind && d.is_active)
        .max_by_key(|d| (d.uploaded_at, d.id))
        .cloned()
}

/// Compute readiness from a proposal's deliverables.
pub fn readiness(deliverables: &[Deliverable]) -> ReadinessReport {
    let tesis = active_of_kind(deliverables, DeliverableKind::Tesis);
    let user_manual = active_of_kind(deliverables, DeliverableKind::ManualUsuario);
    let scientific_article = active_of_kind(deliverables, DeliverableKind::Articulo);

    let present = [&tesis, &user_manual, &scientific_article]
        .iter()
        .filter(|d| d.is_some())
        .count() as u8;

    ReadinessReport {
        tesis,
        user_manual,
        scientific_article,
        completeness: Completeness {
            present,
            required: REQUIRED_DELIVERABLES,
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
