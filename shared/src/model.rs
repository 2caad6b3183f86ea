use serde::{Deserialize, Serialize};
use std::fmt;

use crate::capabilities::http::CatalogEndpoints;
use crate::capabilities::kv::{KeyNamespace, KvKey};
use crate::favorites::FavoritesStore;
use crate::listing::ListingState;
use crate::search::SearchState;
use crate::{
    AppError, ErrorKind, DEFAULT_API_BASE_URL, FAVORITES_STORE_KEY, MAX_SEARCH_DEBOUNCE_MS,
    SEARCH_DEBOUNCE_MS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CharacterId(pub u32);

impl CharacterId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Place {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
}

/// A catalog entry as returned by the API. Never mutated after it is fetched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub id: CharacterId,
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub species: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub gender: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub origin: Option<Place>,
    #[serde(default)]
    pub location: Option<Place>,
    #[serde(default)]
    pub episode: Vec<String>,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub created: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub pages: u32,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterPage {
    #[serde(default)]
    pub info: PageInfo,
    #[serde(default)]
    pub results: Vec<Character>,
}

impl CharacterPage {
    /// `info.next` is null on the last page.
    #[must_use]
    pub fn has_next(&self) -> bool {
        self.info.next.is_some()
    }
}

/// Shell-facing configuration. Unvalidated until turned into [`CatalogSettings`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub api_base_url: String,
    pub search_debounce_ms: u64,
    pub favorites_key: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            search_debounce_ms: SEARCH_DEBOUNCE_MS,
            favorites_key: FAVORITES_STORE_KEY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogSettings {
    pub endpoints: CatalogEndpoints,
    pub search_debounce_ms: u64,
    pub favorites_key: KvKey,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            endpoints: CatalogEndpoints::default(),
            search_debounce_ms: SEARCH_DEBOUNCE_MS,
            favorites_key: KvKey::favorites(),
        }
    }
}

impl TryFrom<CatalogConfig> for CatalogSettings {
    type Error = AppError;

    fn try_from(config: CatalogConfig) -> Result<Self, Self::Error> {
        let endpoints = CatalogEndpoints::new(&config.api_base_url).map_err(|e| {
            AppError::new(ErrorKind::Validation, "invalid catalog API URL")
                .with_internal(e.to_string())
        })?;

        if config.search_debounce_ms > MAX_SEARCH_DEBOUNCE_MS {
            return Err(AppError::new(
                ErrorKind::Validation,
                format!(
                    "search debounce of {}ms exceeds maximum of {MAX_SEARCH_DEBOUNCE_MS}ms",
                    config.search_debounce_ms
                ),
            ));
        }

        let favorites_key = KvKey::new(KeyNamespace::UserData, config.favorites_key).map_err(
            |e| {
                AppError::new(ErrorKind::Validation, "invalid favorites storage key")
                    .with_internal(e.to_string())
            },
        )?;

        Ok(Self {
            endpoints,
            search_debounce_ms: config.search_debounce_ms,
            favorites_key,
        })
    }
}

/// Operation re-issued by `RetryRequested`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryTarget {
    LoadPage,
    Search { term: String },
    HydrateFavorites,
    PersistFavorites,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub error: AppError,
    pub retry: Option<RetryTarget>,
}

#[derive(Debug, Default)]
pub struct Model {
    pub settings: CatalogSettings,
    pub started: bool,

    pub listing: ListingState,
    pub search: SearchState,
    pub favorites: FavoritesStore,

    pub selection: Option<Character>,

    /// Most recent failure; only one is shown at a time.
    pub failure: Option<Failure>,
}

impl Model {
    pub fn report(&mut self, error: AppError, retry: Option<RetryTarget>) {
        self.failure = Some(Failure { error, retry });
    }

    /// Clears the current failure if its retry target matches.
    pub fn resolve_failure(&mut self, matches: impl Fn(&RetryTarget) -> bool) {
        let resolved = self
            .failure
            .as_ref()
            .and_then(|f| f.retry.as_ref())
            .is_some_and(matches);
        if resolved {
            self.failure = None;
        }
    }
}
