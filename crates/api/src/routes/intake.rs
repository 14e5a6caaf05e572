use axum::routing::{get, post};
use axum::Router;

use crate::handlers::intake;
use crate::state::AppState;

/// Home page and intake form.
pub fn page_router() -> Router<AppState> {
    Router::new()
        .route("/", get(intake::home))
        .route("/estimate", get(intake::show_form).post(intake::submit_form))
}

/// JSON submission, mounted under `/api`.
pub fn api_router() -> Router<AppState> {
    Router::new().route("/estimate", post(intake::submit_json))
}
