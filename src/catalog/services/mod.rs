//! Application services for engine discovery.

mod discovery;

pub use discovery::{CatalogService, CatalogServiceError, CatalogServiceResult};
