//! Home page, intake form and estimate submission.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Form, Json};
use priceopt_core::intake::RawIntake;
use priceopt_core::types::EstimateCreated;

use crate::error::{AppResult, UPSTREAM_FAILURE_MESSAGE};
use crate::response::DataResponse;
use crate::state::AppState;
use crate::views::{results_path, FormView};

// ---------------------------------------------------------------------------
// GET / and GET /estimate
// ---------------------------------------------------------------------------

pub async fn home(State(state): State<AppState>) -> AppResult<Html<String>> {
    Ok(Html(state.views.home()?))
}

/// Render the empty intake form with its defaults.
pub async fn show_form(State(state): State<AppState>) -> AppResult<Html<String>> {
    let form = FormView::new(&RawIntake::with_defaults(), &Default::default());
    Ok(Html(state.views.estimate_form(&form)?))
}

// ---------------------------------------------------------------------------
// POST /estimate (form)
// ---------------------------------------------------------------------------

/// Validate and submit the form.
///
/// - invalid input: 400, form re-rendered with messages, nothing sent upstream
/// - upstream failure: 502, form re-rendered with a retry control
/// - success: 303 to the results page
pub async fn submit_form(
    State(state): State<AppState>,
    Form(raw): Form<RawIntake>,
) -> AppResult<Response> {
    let request = match raw.validate() {
        Ok(request) => request,
        Err(errors) => {
            tracing::debug!(fields = %errors, "Intake rejected");
            let html = state.views.estimate_form(&FormView::new(&raw, &errors))?;
            return Ok((StatusCode::BAD_REQUEST, Html(html)).into_response());
        }
    };

    match state.estimator.submit_estimate(&request).await {
        Ok(created) => {
            tracing::info!(estimate_id = %created.id, "Estimate created");
            Ok(Redirect::to(&results_path(&created.id)).into_response())
        }
        Err(err) => {
            tracing::warn!(error = %err, "Estimate submission failed");
            let form = FormView::new(&raw, &Default::default())
                .with_submit_error(UPSTREAM_FAILURE_MESSAGE);
            let html = state.views.estimate_form(&form)?;
            Ok((StatusCode::BAD_GATEWAY, Html(html)).into_response())
        }
    }
}

// ---------------------------------------------------------------------------
// POST /api/estimate (JSON)
// ---------------------------------------------------------------------------

/// JSON form of [`submit_form`]: `{ "data": { "id": ... } }` on success.
pub async fn submit_json(
    State(state): State<AppState>,
    Json(raw): Json<RawIntake>,
) -> AppResult<Json<DataResponse<EstimateCreated>>> {
    let request = raw.validate()?;
    let created = state.estimator.submit_estimate(&request).await?;

    tracing::info!(estimate_id = %created.id, "Estimate created");
    Ok(Json(DataResponse { data: created }))
}
