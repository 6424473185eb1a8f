//! Port contracts for engine discovery and directory lookup.
//!
//! Ports define infrastructure-agnostic interfaces used by catalog services
//! and by the task controller.

mod directory;
mod discovery;

pub use directory::{Directory, DirectoryError, DirectoryResult};
pub use discovery::{AppSpaceListing, Discovery, DiscoveryError, DiscoveryResult};
