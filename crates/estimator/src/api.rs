use std::time::Duration;

use priceopt_core::error::CoreError;
use priceopt_core::types::{EstimateCreated, EstimateRequest, EstimateResult};
use reqwest::{StatusCode, Url};

/// HTTP client for the estimation service.
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct EstimatorApi {
    client: reqwest::Client,
    base_url: Url,
}

/// Errors from the estimation service client.
#[derive(Debug, thiserror::Error)]
pub enum EstimatorError {
    /// The configured base URL cannot address `/estimate`.
    #[error("invalid estimation service URL: {0}")]
    InvalidBaseUrl(String),

    /// The HTTP request itself failed (network, DNS, TLS, timeout, decoding).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The service returned a non-2xx status code.
    #[error("estimation service error ({status}): {body}")]
    ApiError {
        /// HTTP status code.
        status: u16,
        /// Raw response body for debugging.
        body: String,
    },

    /// The service answered 2xx with a record that breaks the result invariants.
    #[error("invalid estimate payload: {0}")]
    InvalidPayload(String),
}

impl EstimatorError {
    /// Whether the service explicitly reported the estimate as unknown.
    pub fn is_not_found(&self) -> bool {
        matches!(self, EstimatorError::ApiError { status, .. } if *status == StatusCode::NOT_FOUND.as_u16())
    }
}

impl From<CoreError> for EstimatorError {
    fn from(err: CoreError) -> Self {
        EstimatorError::InvalidPayload(err.to_string())
    }
}

impl EstimatorApi {
    /// Create a client for the service at `base_url`, e.g.
    /// `http://localhost:8000`. Every request is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, EstimatorError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Self::with_client(client, base_url)
    }

    /// Create a client reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, EstimatorError> {
        let base_url =
            Url::parse(base_url).map_err(|e| EstimatorError::InvalidBaseUrl(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(EstimatorError::InvalidBaseUrl(base_url.to_string()));
        }
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Submit a validated request. Returns the identifier of the new estimate.
    pub async fn submit_estimate(
        &self,
        request: &EstimateRequest,
    ) -> Result<EstimateCreated, EstimatorError> {
        let url = self.estimate_url(None)?;
        tracing::debug!(%url, "Submitting estimate request");

        let response = self.client.post(url).json(request).send().await?;
        let created: EstimateCreated = Self::parse_response(response).await?;

        tracing::info!(estimate_id = %created.id, "Estimate created");
        Ok(created)
    }

    /// Fetch an estimate by id.
    pub async fn get_estimate(&self, id: &str) -> Result<EstimateResult, EstimatorError> {
        let url = self.estimate_url(Some(id))?;
        tracing::debug!(%url, estimate_id = %id, "Fetching estimate");

        let response = self.client.get(url).send().await?;
        let result: EstimateResult = Self::parse_response(response).await?;
        result.check_invariants()?;
        Ok(result)
    }

    // ---- private helpers ----

    /// `{base}/estimate` or `{base}/estimate/{id}`, with `id` escaped as a
    /// single path segment.
    fn estimate_url(&self, id: Option<&str>) -> Result<Url, EstimatorError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| EstimatorError::InvalidBaseUrl(self.base_url.to_string()))?;
            segments.pop_if_empty().push("estimate");
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    /// Ensure the response has a success status code. Returns the
    /// response unchanged on success, or an [`EstimatorError::ApiError`]
    /// containing the status and body text on failure.
    async fn ensure_success(
        response: reqwest::Response,
    ) -> Result<reqwest::Response, EstimatorError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(status = status.as_u16(), "Estimation service returned an error");
            return Err(EstimatorError::ApiError {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    /// Parse a successful JSON response body into the expected type.
    async fn parse_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, EstimatorError> {
        let response = Self::ensure_success(response).await?;
        Ok(response.json::<T>().await?)
    }
}
