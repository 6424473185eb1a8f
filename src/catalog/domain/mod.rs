//! Domain model for engine discovery.
//!
//! Names, template references and participants are validated once at the
//! boundary so the task controller can rely on them without re-checking.

mod catalog;
mod error;
mod names;
mod participant;

pub use catalog::{AppSpace, Catalog, TemplateRef};
pub use error::CatalogDomainError;
pub use names::{QueueName, TemplateName};
pub use participant::{Participant, UserProfile};
