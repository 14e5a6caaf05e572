use axum::routing::get;
use axum::Router;

use crate::handlers::pdf;
use crate::state::AppState;

/// PDF report download, mounted under `/api`.
pub fn router() -> Router<AppState> {
    Router::new().route("/pdf/{id}", get(pdf::download_report))
}
