//! Request handlers.
//!
//! Page handlers render HTML through [`crate::views::Views`]; JSON handlers
//! return [`crate::response::DataResponse`] and map failures via
//! [`crate::error::AppError`].

pub mod intake;
pub mod pdf;
pub mod results;
