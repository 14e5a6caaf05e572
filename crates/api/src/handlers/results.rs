//! Results page.
//!
//! `/results/{id}` renders the loading state only; the single fetch of the
//! estimate happens in `/results/{id}/panel`, which the page loads (and
//! reloads on Retry).

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use chrono::Utc;

use crate::error::AppResult;
use crate::state::AppState;
use crate::views::{PanelView, ResultsView, NOT_FOUND_MESSAGE};

pub async fn results_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    Ok(Html(state.views.results_page(&id)?))
}

/// Fetch the estimate and render either the populated or the error state.
///
/// Every failure (unreachable service, non-2xx, malformed payload) renders
/// the same "not found" banner with status 404.
pub async fn results_panel(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    match state.estimator.get_estimate(&id).await {
        Ok(result) => {
            let view = ResultsView::new(&result, state.config.booking_base_url.as_deref(), Utc::now());
            let html = state.views.results_panel(&PanelView::Ready(view))?;
            Ok(Html(html).into_response())
        }
        Err(err) => {
            tracing::warn!(estimate_id = %id, error = %err, "Estimate lookup failed");
            let panel = PanelView::Error {
                message: NOT_FOUND_MESSAGE,
            };
            let html = state.views.results_panel(&panel)?;
            Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
        }
    }
}
