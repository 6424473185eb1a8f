//! Directory participants and the authenticated user profile.

use super::CatalogDomainError;
use serde::{Deserialize, Serialize};

/// A user or group known to the directory service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    name: String,
    #[serde(rename = "displayName", default, skip_serializing_if = "Option::is_none")]
    display_name: Option<String>,
    #[serde(rename = "emailAddress", default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
}

impl Participant {
    /// Creates a participant with only a login name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogDomainError::EmptyParticipantName`] when the name is
    /// blank.
    pub fn new(name: impl Into<String>) -> Result<Self, CatalogDomainError> {
        let raw = name.into().trim().to_owned();
        if raw.is_empty() {
            return Err(CatalogDomainError::EmptyParticipantName);
        }
        Ok(Self {
            name: raw,
            display_name: None,
            email: None,
        })
    }

    /// Sets the display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// Sets the email address.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Returns the login name used for routing.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the display name, if the directory provided one.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Returns the email address, if the directory provided one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns `true` when this participant is the one named by `name`.
    ///
    /// Directory logins are compared case-insensitively.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name.trim())
    }
}

/// Profile of the user the session authenticated as.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Login name.
    #[serde(default)]
    pub name: String,
    /// Human-readable name.
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    /// Email address.
    #[serde(default)]
    pub email: Option<String>,
    /// Engine-side identifier.
    #[serde(default)]
    pub id: Option<serde_json::Value>,
}
