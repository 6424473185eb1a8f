//! Task lifecycle control against the remote process engine.
//!
//! This module implements the client side of the engine's optimistic
//! concurrency protocol: fetching a step with its version token, locking it,
//! applying validated field and response changes, committing or aborting,
//! reassigning or returning a task, relocating it after the engine moves it,
//! and launching new workflows from templates. The module follows hexagonal
//! architecture:
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
