use std::sync::Arc;

use tesis_core::workflow::DefenseWorkflow;
use tesis_events::EventBus;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything lives behind `Arc` or is already `Clone`.
#[derive(Clone)]
pub struct AppState {
    /// Grading and finalization engine over the configured store.
    pub workflow: Arc<DefenseWorkflow>,
    /// Database pool backing the store. `None` when running on the
    /// in-memory store.
    pub pool: Option<tesis_db::DbPool>,
    pub config: Arc<ServerConfig>,
    /// Bus for `defense.graded` / `defense.finalized` events.
    pub event_bus: Arc<EventBus>,
}
