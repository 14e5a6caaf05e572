//! REST client for the external estimation service.
//!
//! The service owns the valuation algorithm and the estimate records; this
//! crate only speaks its HTTP contract:
//!
//! ```text
//! POST /estimate        {address, property}  -> {id, ...}
//! GET  /estimate/{id}                        -> EstimateResult
//! ```
//!
//! Any non-2xx status is an error. Nothing is retried here; retries are
//! always initiated by the user.

mod api;

pub use api::{EstimatorApi, EstimatorError};
