pub mod defense;
pub mod evaluation;
pub mod health;
pub mod proposal;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /proposals/eligible                               eligible proposals
/// /proposals/{proposal_id}/readiness                document readiness
///
/// /evaluations/mine                                 caller's defenses
///
/// /defenses/actions                                 caller's allowed actions
/// /defenses/{kind}/{defense_id}/grade               submit grade (POST)
/// /defenses/{kind}/{defense_id}/finalize            finalize (POST, finalizers)
/// /defenses/{kind}/{defense_id}/jury-comments       jury comments (finalizers)
/// /defenses/{kind}/{defense_id}/my-evaluation       caller's evaluation
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/proposals", proposal::router())
        .nest("/evaluations", evaluation::router())
        .nest("/defenses", defense::router())
}
