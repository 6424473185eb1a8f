//! Error types for catalog domain validation.

use thiserror::Error;

/// Errors returned while constructing catalog domain values.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CatalogDomainError {
    /// A queue (workbasket) name is empty after trimming.
    #[error("queue name must not be empty")]
    EmptyQueueName,

    /// A work class name is empty after trimming.
    #[error("template name must not be empty")]
    EmptyTemplateName,

    /// A work class was listed without a resource URI.
    #[error("template '{0}' has no resource URI")]
    MissingTemplateUri(String),

    /// A participant name is empty after trimming.
    #[error("participant name must not be empty")]
    EmptyParticipantName,
}
