//! Repository layer.
//!
//! Each repository is a zero-sized struct. Reads take `&PgPool`; writes
//! take `&mut PgConnection` so they can run inside a caller-owned
//! transaction.

pub mod defense_repo;
pub mod deliverable_repo;
pub mod evaluation_repo;
pub mod finalization_repo;
pub mod proposal_repo;

pub use defense_repo::DefenseRepo;
pub use deliverable_repo::DeliverableRepo;
pub use evaluation_repo::EvaluationRepo;
pub use finalization_repo::FinalizationRepo;
pub use proposal_repo::ProposalRepo;
