//! REST adapters for the process engine.

mod engine;
mod locator;

pub use engine::RestProcessEngine;
pub use locator::ResourceLocator;
