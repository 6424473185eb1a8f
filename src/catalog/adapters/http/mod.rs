//! REST adapters for discovery and directory lookup.

mod directory;
mod discovery;

pub use directory::RestDirectory;
pub use discovery::RestDiscovery;
