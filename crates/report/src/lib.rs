//! PDF report generation for estimates.
//!
//! The pipeline is fetch → select comps → render HTML → convert to PDF:
//!
//! 1. [`ReportRenderer::render`] fetches the estimate from the estimation
//!    service (a failed fetch is [`ReportError::NotFound`]).
//! 2. [`template::render_report_html`] fills the fixed report template with
//!    at most the first five comps.
//! 3. A [`pdf::PdfEngine`] converts the HTML. The production engine,
//!    [`pdf::ChromiumEngine`], runs a headless browser inside a scoped
//!    session that is torn down on every exit path, and prints through the
//!    DevTools protocol.

mod devtools;
pub mod error;
pub mod pdf;
pub mod template;

use std::sync::Arc;

use priceopt_estimator::EstimatorApi;

pub use error::{RenderError, ReportError};
pub use pdf::{ChromiumEngine, PdfEngine, PdfOptions, PrintParams};

/// Orchestrates the report pipeline for one estimate at a time.
#[derive(Clone)]
pub struct ReportRenderer {
    estimator: EstimatorApi,
    engine: Arc<dyn PdfEngine>,
    options: PdfOptions,
}

impl ReportRenderer {
    pub fn new(estimator: EstimatorApi, engine: Arc<dyn PdfEngine>, options: PdfOptions) -> Self {
        Self {
            estimator,
            engine,
            options,
        }
    }

    pub fn options(&self) -> &PdfOptions {
        &self.options
    }

    /// Produce the PDF report for estimate `id`.
    ///
    /// The browser is only acquired after the estimate has been fetched and
    /// the HTML rendered, so lookups that fail never start one.
    pub async fn render(&self, id: &str) -> Result<Vec<u8>, ReportError> {
        let result = self
            .estimator
            .get_estimate(id)
            .await
            .map_err(|source| ReportError::NotFound {
                id: id.to_string(),
                source,
            })?;

        let html = template::render_report_html(&result, chrono::Utc::now())?;
        let pdf = self.engine.render_pdf(&html, &self.options).await?;

        tracing::info!(estimate_id = %id, bytes = pdf.len(), "PDF report rendered");
        Ok(pdf)
    }
}

/// Download name for the report of estimate `id`: `estimate-<id>.pdf`.
///
/// Characters outside `[A-Za-z0-9._-]` are replaced with `_` so the name is
/// always safe inside a `Content-Disposition` header.
pub fn report_filename(id: &str) -> String {
    let safe: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("estimate-{safe}.pdf")
}
