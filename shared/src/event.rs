use serde::{Deserialize, Serialize};

use crate::capabilities::{DelayOutput, TimerId};
use crate::listing::FetchTicket;
use crate::model::{CatalogConfig, CharacterId, CharacterPage};
use crate::AppResult;

// --- Event enum: shell events first, capability responses skipped from serde ---

#[derive(Serialize, Deserialize, Debug)]
pub enum Event {
    // Lifecycle
    Started,
    Configure(CatalogConfig),

    // Listing
    EndReached,

    // Search
    SearchChanged(String),
    SearchCleared,

    // Favorites & detail
    FavoriteToggled(CharacterId),
    CharacterSelected(CharacterId),
    DetailClosed,

    // Errors
    RetryRequested,
    ErrorDismissed,

    // Capability responses (boxed to keep enum size small)
    #[serde(skip)]
    PageFetched {
        ticket: FetchTicket,
        outcome: Box<AppResult<CharacterPage>>,
    },
    #[serde(skip)]
    SearchDelayElapsed { timer: TimerId, output: DelayOutput },
    #[serde(skip)]
    SearchFetched {
        ticket: FetchTicket,
        outcome: Box<AppResult<CharacterPage>>,
    },
    #[serde(skip)]
    FavoritesLoaded(Box<AppResult<Option<Vec<u8>>>>),
    #[serde(skip)]
    FavoritesPersisted(Box<AppResult<()>>),
}

impl Event {
    /// Stable name for log spans.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Started => "started",
            Self::Configure(_) => "configure",
            Self::EndReached => "end_reached",
            Self::SearchChanged(_) => "search_changed",
            Self::SearchCleared => "search_cleared",
            Self::FavoriteToggled(_) => "favorite_toggled",
            Self::CharacterSelected(_) => "character_selected",
            Self::DetailClosed => "detail_closed",
            Self::RetryRequested => "retry_requested",
            Self::ErrorDismissed => "error_dismissed",
            Self::PageFetched { .. } => "page_fetched",
            Self::SearchDelayElapsed { .. } => "search_delay_elapsed",
            Self::SearchFetched { .. } => "search_fetched",
            Self::FavoritesLoaded(_) => "favorites_loaded",
            Self::FavoritesPersisted(_) => "favorites_persisted",
        }
    }

    #[must_use]
    pub const fn is_user_initiated(&self) -> bool {
        matches!(
            self,
            Self::EndReached
                | Self::SearchChanged(_)
                | Self::SearchCleared
                | Self::FavoriteToggled(_)
                | Self::CharacterSelected(_)
                | Self::DetailClosed
                | Self::RetryRequested
                | Self::ErrorDismissed
        )
    }
}
