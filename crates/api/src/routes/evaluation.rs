//! Route definitions for the `/evaluations` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::evaluation;
use crate::state::AppState;

/// Routes mounted at `/evaluations`.
pub fn router() -> Router<AppState> {
    Router::new().route("/mine", get(evaluation::list_mine))
}
