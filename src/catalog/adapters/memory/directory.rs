//! In-memory directory service.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::catalog::{
    domain::Participant,
    ports::{Directory, DirectoryError, DirectoryResult},
};

/// Thread-safe in-memory directory.
///
/// A search matches participants whose login or display name contains the
/// search text, ignoring ASCII case.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDirectory {
    participants: Arc<RwLock<Vec<Participant>>>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory holding `participants`.
    #[must_use]
    pub fn with_participants(participants: impl IntoIterator<Item = Participant>) -> Self {
        Self {
            participants: Arc::new(RwLock::new(participants.into_iter().collect())),
        }
    }

    /// Adds a participant.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::Unavailable`] when the state lock is
    /// poisoned.
    pub fn insert(&self, participant: Participant) -> DirectoryResult<()> {
        self.participants
            .write()
            .map_err(|err| DirectoryError::unavailable(std::io::Error::other(err.to_string())))?
            .push(participant);
        Ok(())
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn find_participants(&self, search: &str) -> DirectoryResult<Vec<Participant>> {
        let needle = search.trim();
        let participants = self
            .participants
            .read()
            .map_err(|err| DirectoryError::unavailable(std::io::Error::other(err.to_string())))?;
        Ok(participants
            .iter()
            .filter(|participant| {
                contains_ignore_case(participant.name(), needle)
                    || participant
                        .display_name()
                        .is_some_and(|display| contains_ignore_case(display, needle))
            })
            .cloned()
            .collect())
    }
}
