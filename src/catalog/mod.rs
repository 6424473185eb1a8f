//! Read-only discovery of the process engine's shape.
//!
//! The catalog context walks the engine once per session to learn which
//! appspaces, roles, workbaskets and work classes exist, and wraps the
//! directory service used to resolve participants. Everything it returns is
//! read-only after discovery. The module follows hexagonal architecture:
//!
//! - Domain types in [`domain`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;

#[cfg(test)]
mod tests;
