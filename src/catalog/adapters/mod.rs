//! Adapters for the catalog module.
//!
//! # Available Adapters
//!
//! - [`http::RestDiscovery`] and [`http::RestDirectory`]: the engine's REST
//!   listings and participant search
//! - [`memory::InMemoryDiscovery`] and [`memory::InMemoryDirectory`]: fixed
//!   listings for tests

pub mod http;
pub mod memory;
