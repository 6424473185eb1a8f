//! In-memory adapter implementations for testing.
//!
//! These adapters provide simple, thread-safe implementations suitable for
//! exercising the task services without a running engine.

mod engine;

pub use engine::{InMemoryProcessEngine, RecordedAction};
