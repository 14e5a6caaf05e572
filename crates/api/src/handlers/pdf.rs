//! PDF report download.

use axum::extract::{Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use priceopt_report::{report_filename, ReportError};

use crate::state::AppState;

/// Failure of the PDF endpoint.
///
/// Answers `500` with a plain-text diagnostic rather than the JSON error
/// body used by the rest of the API.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct PdfError(#[from] pub ReportError);

impl IntoResponse for PdfError {
    fn into_response(self) -> Response {
        let diagnostic = match &self.0 {
            ReportError::NotFound { id, .. } => format!("Estimate {id} not found"),
            other => other.to_string(),
        };
        tracing::error!(error = %self.0, "PDF generation failed");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("PDF generation failed: {diagnostic}"),
        )
            .into_response()
    }
}

/// GET /api/pdf/{id} -- render the estimate report as an inline PDF.
pub async fn download_report(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, PdfError> {
    let pdf = state.reports.render(&id).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename={}", report_filename(&id)),
            ),
        ],
        pdf,
    )
        .into_response())
}
