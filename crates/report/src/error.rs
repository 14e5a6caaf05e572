use priceopt_estimator::EstimatorError;

/// Failures converting HTML to PDF.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to launch headless browser: {0}")]
    Spawn(std::io::Error),

    #[error("PDF conversion exceeded its {budget_ms}ms budget")]
    Timeout { budget_ms: u64 },

    #[error("headless browser exited with code {exit_code:?}: {stderr}")]
    BrowserFailed {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("DevTools protocol error: {0}")]
    DevTools(String),

    #[error("headless browser output is not a PDF document")]
    InvalidOutput,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failures of the report pipeline as a whole.
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("Estimate {id} not found: {source}")]
    NotFound {
        id: String,
        #[source]
        source: EstimatorError,
    },

    #[error("template rendering failed: {0}")]
    Template(String),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl From<tera::Error> for ReportError {
    fn from(e: tera::Error) -> Self {
        ReportError::Template(e.to_string())
    }
}
