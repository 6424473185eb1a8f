//! Adapters for the task module.
//!
//! # Available Adapters
//!
//! - [`http::RestProcessEngine`]: the engine's BPM REST interface over
//!   [`crate::rest::RestClient`]
//! - [`memory::InMemoryProcessEngine`]: thread-safe in-memory engine for
//!   tests and local experimentation

pub mod http;
pub mod memory;
