use axum::routing::get;
use axum::Router;

use crate::handlers::results;
use crate::state::AppState;

/// Results page and its content fragment.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/results/{id}", get(results::results_page))
        .route("/results/{id}/panel", get(results::results_panel))
}
