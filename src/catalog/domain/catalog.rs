//! Session catalog produced by a single discovery walk.

use super::{CatalogDomainError, QueueName, TemplateName};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An appspace and the roles (workbaskets) it exposes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppSpace {
    name: String,
    roles: Vec<QueueName>,
}

impl AppSpace {
    /// Creates an appspace entry.
    #[must_use]
    pub fn new(name: impl Into<String>, roles: impl IntoIterator<Item = QueueName>) -> Self {
        Self {
            name: name.into(),
            roles: roles.into_iter().collect(),
        }
    }

    /// Returns the appspace name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the role names, each of which doubles as a workbasket name.
    #[must_use]
    pub fn roles(&self) -> &[QueueName] {
        &self.roles
    }
}

/// Reference to a launchable work class.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TemplateRef {
    name: TemplateName,
    uri: String,
}

impl TemplateRef {
    /// Creates a template reference.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogDomainError`] when the name is blank or the URI is
    /// empty.
    pub fn new(
        name: impl Into<String>,
        uri: impl Into<String>,
    ) -> Result<Self, CatalogDomainError> {
        let template_name = TemplateName::new(name)?;
        let raw_uri = uri.into();
        let trimmed_uri = raw_uri.trim();
        if trimmed_uri.is_empty() {
            return Err(CatalogDomainError::MissingTemplateUri(
                template_name.as_str().to_owned(),
            ));
        }
        Ok(Self {
            name: template_name,
            uri: trimmed_uri.to_owned(),
        })
    }

    /// Returns the template name.
    #[must_use]
    pub const fn name(&self) -> &TemplateName {
        &self.name
    }

    /// Returns the template resource URI, relative to the engine base URL.
    #[must_use]
    pub fn uri(&self) -> &str {
        &self.uri
    }
}

/// Read-only snapshot of the engine's appspaces, queues and work classes.
///
/// A catalog is owned by one client session. It is never mutated after
/// discovery; callers that need fresher data run discovery again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    appspaces: Vec<AppSpace>,
    templates: BTreeMap<TemplateName, TemplateRef>,
}

impl Catalog {
    /// Creates a catalog from discovered appspaces and templates.
    #[must_use]
    pub fn new(
        appspaces: impl IntoIterator<Item = AppSpace>,
        templates: impl IntoIterator<Item = TemplateRef>,
    ) -> Self {
        Self {
            appspaces: appspaces.into_iter().collect(),
            templates: templates
                .into_iter()
                .map(|template| (template.name().clone(), template))
                .collect(),
        }
    }

    /// Returns discovered appspaces in discovery order.
    #[must_use]
    pub fn appspaces(&self) -> &[AppSpace] {
        &self.appspaces
    }

    /// Returns every distinct queue name across all appspaces, sorted.
    #[must_use]
    pub fn queue_names(&self) -> Vec<QueueName> {
        let mut names: Vec<QueueName> = self
            .appspaces
            .iter()
            .flat_map(|appspace| appspace.roles().iter().cloned())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    /// Returns `true` when any appspace exposes the given queue.
    #[must_use]
    pub fn has_queue(&self, queue: &QueueName) -> bool {
        self.appspaces
            .iter()
            .any(|appspace| appspace.roles().contains(queue))
    }

    /// Looks up a template by name.
    #[must_use]
    pub fn template(&self, name: &str) -> Option<&TemplateRef> {
        self.templates
            .iter()
            .find(|(template_name, _)| template_name.as_str() == name)
            .map(|(_, template)| template)
    }

    /// Returns the known template names, sorted.
    #[must_use]
    pub fn template_names(&self) -> Vec<&TemplateName> {
        self.templates.keys().collect()
    }
}
