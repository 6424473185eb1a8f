//! Validated names for workbaskets and work classes.

use super::CatalogDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a queue (workbasket) as exposed by the engine's role listing.
///
/// Names are trimmed but otherwise kept verbatim; the engine treats them as
/// case-sensitive path segments.
///
/// # Examples
///
///     use workbasket::catalog::domain::QueueName;
///
///     let name = QueueName::new(" Inbox ").expect("valid");
///     assert_eq!(name.as_str(), "Inbox");
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueueName(String);

impl QueueName {
    /// Creates a validated queue name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogDomainError::EmptyQueueName`] when the value is blank.
    pub fn new(value: impl Into<String>) -> Result<Self, CatalogDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CatalogDomainError::EmptyQueueName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the queue name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for QueueName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for QueueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Name of a work class (workflow template).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateName(String);

impl TemplateName {
    /// Creates a validated template name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogDomainError::EmptyTemplateName`] when the value is
    /// blank.
    pub fn new(value: impl Into<String>) -> Result<Self, CatalogDomainError> {
        let raw = value.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(CatalogDomainError::EmptyTemplateName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the template name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for TemplateName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for TemplateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
