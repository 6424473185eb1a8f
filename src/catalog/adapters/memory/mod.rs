//! In-memory catalog adapters for testing.

mod directory;
mod discovery;

pub use directory::InMemoryDirectory;
pub use discovery::InMemoryDiscovery;
