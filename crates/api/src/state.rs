use std::sync::Arc;

use priceopt_estimator::{EstimatorApi, EstimatorError};
use priceopt_report::{PdfEngine, PdfOptions, ReportRenderer};

use crate::config::ServerConfig;
use crate::views::Views;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable; nothing in it is mutated after startup.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Client for the external estimation service.
    pub estimator: EstimatorApi,
    /// Fetch → template → PDF pipeline.
    pub reports: ReportRenderer,
    /// Compiled page templates.
    pub views: Views,
}

/// Failure to assemble [`AppState`] at startup.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error(transparent)]
    Estimator(#[from] EstimatorError),

    #[error("Failed to compile page templates: {0}")]
    Templates(#[from] tera::Error),
}

impl AppState {
    /// Build the state from configuration, converting PDFs with `engine`.
    pub fn new(config: ServerConfig, engine: Arc<dyn PdfEngine>) -> Result<Self, StateError> {
        let estimator =
            EstimatorApi::new(&config.estimator_base_url, config.estimator_timeout())?;
        let options = PdfOptions::letter().with_timeout(config.pdf_timeout());
        let reports = ReportRenderer::new(estimator.clone(), engine, options);

        Ok(Self {
            config: Arc::new(config),
            estimator,
            reports,
            views: Views::new()?,
        })
    }
}
