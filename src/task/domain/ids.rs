//! Identifier and token types for remote task resources.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! remote_identifier {
    ($(#[$meta:meta])* $name:ident, $empty:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates a validated value, trimming surrounding whitespace.
            ///
            /// # Errors
            ///
            /// Returns [`TaskDomainError`] when the value is blank.
            pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
                let raw = value.into();
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err($empty);
                }
                Ok(Self(trimmed.to_owned()))
            }

            /// Returns the value as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

remote_identifier!(
    /// Stable identifier of a work object across every step and queue it
    /// passes through.
    WorkObjectNumber,
    TaskDomainError::EmptyWorkObjectNumber
);

remote_identifier!(
    /// URI of a task's mutable step resource, usually relative to the engine
    /// REST root.
    StepElementUri,
    TaskDomainError::EmptyStepElementUri
);

remote_identifier!(
    /// Opaque optimistic-concurrency token (the resource `ETag`).
    ///
    /// A token is valid until the next successful mutation of the resource it
    /// was read from. The engine rejects stale tokens with a precondition
    /// failure.
    VersionToken,
    TaskDomainError::EmptyVersionToken
);
