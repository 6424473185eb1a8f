//! In-memory discovery listings.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::catalog::{
    domain::{TemplateRef, UserProfile},
    ports::{AppSpaceListing, Discovery, DiscoveryError, DiscoveryResult},
};

/// Fixed discovery listings, editable between calls.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDiscovery {
    state: Arc<RwLock<DiscoveryState>>,
}

#[derive(Debug, Default)]
struct DiscoveryState {
    appspaces: Vec<(String, Vec<String>)>,
    templates: Vec<TemplateRef>,
    user: UserProfile,
}

fn roles_uri(appspace: &str) -> String {
    format!("appspaces/{appspace}/rolenames")
}

impl InMemoryDiscovery {
    /// Creates empty listings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an appspace with its role names.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Unavailable`] when the state lock is
    /// poisoned.
    pub fn add_appspace<I, S>(&self, name: &str, roles: I) -> DiscoveryResult<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.state.write().map_err(|err| {
            DiscoveryError::unavailable(std::io::Error::other(err.to_string()))
        })?;
        state
            .appspaces
            .push((name.to_owned(), roles.into_iter().map(Into::into).collect()));
        Ok(())
    }

    /// Adds a launchable work class.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Unavailable`] when the state lock is
    /// poisoned.
    pub fn add_template(&self, template: TemplateRef) -> DiscoveryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            DiscoveryError::unavailable(std::io::Error::other(err.to_string()))
        })?;
        state.templates.push(template);
        Ok(())
    }

    /// Sets the authenticated user's profile.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Unavailable`] when the state lock is
    /// poisoned.
    pub fn set_user(&self, user: UserProfile) -> DiscoveryResult<()> {
        let mut state = self.state.write().map_err(|err| {
            DiscoveryError::unavailable(std::io::Error::other(err.to_string()))
        })?;
        state.user = user;
        Ok(())
    }

    fn read<T>(&self, view: impl FnOnce(&DiscoveryState) -> T) -> DiscoveryResult<T> {
        let state = self.state.read().map_err(|err| {
            DiscoveryError::unavailable(std::io::Error::other(err.to_string()))
        })?;
        Ok(view(&state))
    }
}

#[async_trait]
impl Discovery for InMemoryDiscovery {
    async fn appspaces(&self) -> DiscoveryResult<Vec<AppSpaceListing>> {
        self.read(|state| {
            state
                .appspaces
                .iter()
                .map(|(name, _)| AppSpaceListing {
                    name: name.clone(),
                    roles_uri: roles_uri(name),
                })
                .collect()
        })
    }

    async fn role_names(&self, uri: &str) -> DiscoveryResult<Vec<String>> {
        self.read(|state| {
            state
                .appspaces
                .iter()
                .find(|(name, _)| roles_uri(name) == uri)
                .map(|(_, roles)| roles.clone())
        })?
        .ok_or_else(|| DiscoveryError::NotFound(uri.to_owned()))
    }

    async fn work_classes(&self) -> DiscoveryResult<Vec<TemplateRef>> {
        self.read(|state| state.templates.clone())
    }

    async fn current_user(&self) -> DiscoveryResult<UserProfile> {
        self.read(|state| state.user.clone())
    }
}
