//! Port contracts for task lifecycle control.
//!
//! Ports define transport-agnostic interfaces used by task services.

pub mod engine;

pub use engine::{EngineError, EngineResult, ProcessEngine};
