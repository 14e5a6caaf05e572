//! Domain types and pure logic for the Price Optimizer.
//!
//! Nothing in this crate performs I/O: the estimation service client lives
//! in `priceopt-estimator`, report rendering in `priceopt-report`.

pub mod booking;
pub mod comps;
pub mod error;
pub mod format;
pub mod intake;
pub mod types;
