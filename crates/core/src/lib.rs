//! Domain logic for thesis defense evaluation.
//!
//! - [`workflow::DefenseWorkflow`]: the grading and finalization engine.
//! - [`store::DefenseStore`]: persistence seam, with an in-memory store.
//! - [`readiness`], [`aggregator`]: pure read-side computations.

pub mod aggregator;
pub mod defense;
pub mod error;
pub mod grading;
pub mod proposal;
pub mod readiness;
pub mod roles;
pub mod store;
pub mod types;
pub mod workflow;
