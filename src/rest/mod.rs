//! Shared HTTP transport for the engine's REST interface.
//!
//! [`RestClient`] owns authentication, timeouts and status classification.
//! Context-specific adapters build resource URLs and decode bodies on top of
//! it.

mod client;
mod error;

pub use client::{RestClient, RestResponse};
pub use error::{RestError, RestResult};
