pub mod health;
pub mod intake;
pub mod pdf;
pub mod results;

use axum::Router;

use crate::state::AppState;

/// Server-rendered pages, mounted at the root.
///
/// ```text
/// GET  /                          home
/// GET  /estimate                  intake form
/// POST /estimate                  submit form
/// GET  /results/{id}              results page (loading state)
/// GET  /results/{id}/panel        results content (error or populated)
/// ```
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .merge(intake::page_router())
        .merge(results::router())
}

/// Build the `/api` route tree.
///
/// ```text
/// POST /estimate                  JSON submission
/// GET  /pdf/{id}                  PDF report
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(intake::api_router())
        .merge(pdf::router())
}
