//! Route definitions for the `/proposals` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::proposal;
use crate::state::AppState;

/// Routes mounted at `/proposals`.
///
/// ```text
/// GET    /eligible                   -> list_eligible
/// GET    /{proposal_id}/readiness    -> readiness
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/eligible", get(proposal::list_eligible))
        .route("/{proposal_id}/readiness", get(proposal::readiness))
}
