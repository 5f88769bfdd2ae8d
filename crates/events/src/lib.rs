//! Defense domain events.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`DefenseEvent`]: the event envelope published after a grade or a
//!   finalization is committed.
//! - [`AuditLog`]: background listener that writes every event to the
//!   structured log.

pub mod audit;
pub mod bus;

pub use audit::AuditLog;
pub use bus::{DefenseEvent, EventBus, EVENT_DEFENSE_FINALIZED, EVENT_DEFENSE_GRADED};
