//! Inbound adapters
//!
//! - `http` - axum router and handlers
//! - `validation` - request body checks
//! - `dto` - response bodies and pagination links
//! - `error` - error to response mapping

pub mod dto;
pub mod error;
pub mod http;
pub mod validation;

pub use error::ApiError;
pub use http::{router, AppState};
