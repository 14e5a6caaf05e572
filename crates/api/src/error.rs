use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use priceopt_core::intake::FieldErrors;
use priceopt_estimator::EstimatorError;
use serde_json::json;

/// Message shown whenever the estimation service cannot produce an estimate.
pub const UPSTREAM_FAILURE_MESSAGE: &str = "Could not get estimate. Please try again.";

/// Application-level error type for HTTP handlers.
///
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// The submission failed intake validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] FieldErrors),

    /// The estimation service failed or answered with a non-2xx status.
    #[error(transparent)]
    Estimator(#[from] EstimatorError),

    /// A page template failed to render.
    #[error("Template error: {0}")]
    Template(#[from] tera::Error),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Validation(fields) => {
                let body = json!({
                    "error": "Validation failed",
                    "code": "VALIDATION_ERROR",
                    "fields": fields,
                });
                return (StatusCode::BAD_REQUEST, axum::Json(body)).into_response();
            }

            AppError::Estimator(err) => {
                tracing::warn!(error = %err, "Estimation service request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "UPSTREAM_ERROR",
                    UPSTREAM_FAILURE_MESSAGE.to_string(),
                )
            }

            AppError::Template(err) => {
                tracing::error!(error = %err, "Template rendering failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
