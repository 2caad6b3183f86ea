//! Locally persisted favorites.
//!
//! The map is sparse: a character is a favorite when its id maps to `true`,
//! and un-favoriting removes the entry so the stored snapshot only ever
//! holds `true` values. The store refuses writes until the stored snapshot
//! has been read once, so an empty in-memory map can never overwrite data
//! that simply has not loaded yet.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::warn;

use crate::capabilities::kv::{check_value_size, KvError};
use crate::model::CharacterId;
use crate::{AppError, ErrorKind};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FavoritesError {
    #[error("favorites have not been loaded yet")]
    NotHydrated,

    #[error("favorites were already loaded")]
    AlreadyHydrated,

    #[error("favorites snapshot could not be encoded: {0}")]
    Encode(String),

    #[error("favorites snapshot too large: {size} bytes exceeds maximum of {max} bytes")]
    TooLarge { size: usize, max: usize },
}

impl From<FavoritesError> for AppError {
    fn from(error: FavoritesError) -> Self {
        let kind = match error {
            FavoritesError::NotHydrated | FavoritesError::AlreadyHydrated => {
                ErrorKind::InvalidState
            }
            FavoritesError::Encode(_) | FavoritesError::TooLarge { .. } => ErrorKind::Storage,
        };
        AppError::new(kind, "favorites could not be saved").with_internal(error.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct FavoritesStore {
    entries: BTreeMap<CharacterId, bool>,
    hydrated: bool,
}

impl FavoritesStore {
    /// Loads the stored snapshot. Runs once; `None` means nothing was ever
    /// stored. Returns the number of favorites restored.
    pub fn hydrate(&mut self, stored: Option<&[u8]>) -> Result<usize, FavoritesError> {
        if self.hydrated {
            return Err(FavoritesError::AlreadyHydrated);
        }

        let restored = match stored {
            None => BTreeMap::new(),
            Some(bytes) if bytes.is_empty() => BTreeMap::new(),
            Some(bytes) => match serde_json::from_slice::<BTreeMap<CharacterId, bool>>(bytes) {
                Ok(map) => map.into_iter().filter(|(_, favorite)| *favorite).collect(),
                Err(e) => {
                    warn!(error = %e, bytes = bytes.len(), "discarding unreadable favorites snapshot");
                    BTreeMap::new()
                }
            },
        };

        self.entries = restored;
        self.hydrated = true;
        Ok(self.entries.len())
    }

    /// Flips the flag for `id` and returns the new value.
    pub fn toggle(&mut self, id: CharacterId) -> Result<bool, FavoritesError> {
        if !self.hydrated {
            return Err(FavoritesError::NotHydrated);
        }

        if self.entries.remove(&id).is_some() {
            Ok(false)
        } else {
            self.entries.insert(id, true);
            Ok(true)
        }
    }

    #[must_use]
    pub fn is_favorite(&self, id: CharacterId) -> bool {
        self.entries.get(&id).copied().unwrap_or(false)
    }

    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<CharacterId, bool> {
        self.entries.clone()
    }

    /// Serializes the full map as `{"<id>": true, ...}`.
    pub fn encode(&self) -> Result<Vec<u8>, FavoritesError> {
        if !self.hydrated {
            return Err(FavoritesError::NotHydrated);
        }

        let bytes =
            serde_json::to_vec(&self.entries).map_err(|e| FavoritesError::Encode(e.to_string()))?;

        check_value_size(bytes.len()).map_err(|e| match e {
            KvError::ValueTooLarge { size, max } => FavoritesError::TooLarge { size, max },
            other => FavoritesError::Encode(other.to_string()),
        })?;

        Ok(bytes)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }
}
