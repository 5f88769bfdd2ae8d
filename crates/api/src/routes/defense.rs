//! Route definitions for the `/defenses` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::defense;
use crate::state::AppState;

/// Routes mounted at `/defenses`.
///
/// ```text
/// GET    /actions                               -> allowed
/// POST   /{kind}/{defense_id}/grade             -> grade
/// POST   /{kind}/{defense_id}/finalize          -> finalize
/// GET    /{kind}/{defense_id}/jury-comments     -> jury_comments
/// GET    /{kind}/{defense_id}/my-evaluation     -> my_evaluation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/actions", get(defense::allowed))
        .route("/{kind}/{defense_id}/grade", post(defense::grade))
        .route("/{kind}/{defense_id}/finalize", post(defense::finalize))
        .route("/{kind}/{defense_id}/jury-comments", get(defense::jury_comments))
        .route("/{kind}/{defense_id}/my-evaluation", get(defense::my_evaluation))
}
