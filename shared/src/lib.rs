// lib.rs - Character catalog core

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod capabilities;
pub mod event;
pub mod favorites;
pub mod listing;
pub mod model;
pub mod search;
pub mod view;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use crux_core::App as CruxApp;
pub use event::Event;
pub use model::{
    CatalogConfig, CatalogSettings, Character, CharacterId, CharacterPage, Failure, Model,
    PageInfo, Place, RetryTarget,
};
pub use view::{CharacterCard, CharacterDetail, UserFacingError, ViewModel};

pub const DEFAULT_API_BASE_URL: &str = "https://rickandmortyapi.com/api";
pub const CHARACTER_RESOURCE: &str = "character";
pub const FIRST_PAGE: u32 = 1;
pub const SEARCH_DEBOUNCE_MS: u64 = 300;
pub const MAX_SEARCH_DEBOUNCE_MS: u64 = 5_000;
pub const MAX_SEARCH_TERM_LENGTH: usize = 256;
pub const FAVORITES_STORE_KEY: &str = "favorites";
pub const UNKNOWN_DETAIL: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorSeverity {
    Transient,
    Permanent,
    Fatal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorKind {
    Network,
    Timeout,
    NotFound,
    RateLimited,
    Server,
    Deserialization,
    Storage,
    Validation,
    InvalidState,
    Unknown,
}

impl ErrorKind {
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Network => "NETWORK_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::NotFound => "NOT_FOUND",
            Self::RateLimited => "RATE_LIMITED",
            Self::Server => "SERVER_ERROR",
            Self::Deserialization => "DESERIALIZATION_ERROR",
            Self::Storage => "STORAGE_ERROR",
            Self::Validation => "VALIDATION_ERROR",
            Self::InvalidState => "INVALID_STATE",
            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    #[must_use]
    pub const fn default_severity(self) -> ErrorSeverity {
        match self {
            Self::Network | Self::Timeout | Self::RateLimited | Self::Server | Self::Storage => {
                ErrorSeverity::Transient
            }

            Self::Deserialization | Self::InvalidState => ErrorSeverity::Fatal,

            Self::NotFound | Self::Validation | Self::Unknown => ErrorSeverity::Permanent,
        }
    }

    #[must_use]
    pub const fn is_retryable(self) -> bool {
        matches!(
            self,
            Self::Network | Self::Timeout | Self::RateLimited | Self::Server | Self::Storage
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppError {
    pub kind: ErrorKind,
    pub severity: ErrorSeverity,
    pub message: String,
    pub internal_message: Option<String>,
    pub context: HashMap<String, String>,
}

impl AppError {
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            severity: kind.default_severity(),
            message: message.into(),
            internal_message: None,
            context: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_internal(mut self, internal: impl Into<String>) -> Self {
        self.internal_message = Some(internal.into());
        self
    }

    #[must_use]
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.kind.is_retryable() && !matches!(self.severity, ErrorSeverity::Fatal)
    }

    #[must_use]
    pub fn user_facing_message(&self) -> String {
        match self.kind {
            ErrorKind::Network => {
                "Unable to reach the catalog. Please check your internet connection and try again."
                    .into()
            }
            ErrorKind::Timeout => "The request timed out. Please try again.".into(),
            ErrorKind::NotFound => "Nothing was found for this request.".into(),
            ErrorKind::RateLimited => {
                "Too many requests. Please wait a moment and try again.".into()
            }
            ErrorKind::Server => {
                "The catalog is having trouble right now. Please try again shortly.".into()
            }
            ErrorKind::Deserialization => {
                "The catalog sent data this app could not read.".into()
            }
            ErrorKind::Storage => "Unable to save your favorites on this device.".into(),
            ErrorKind::Validation => self.message.clone(),
            ErrorKind::InvalidState => {
                "The app is in an unexpected state. Please restart the app.".into()
            }
            ErrorKind::Unknown => "An unexpected error occurred. Please try again.".into(),
        }
    }

    #[must_use]
    pub fn from_http_status(status: u16, body: Option<&[u8]>) -> Self {
        let kind = match status {
            404 => ErrorKind::NotFound,
            408 => ErrorKind::Timeout,
            429 => ErrorKind::RateLimited,
            400..=499 => ErrorKind::Validation,
            500..=599 => ErrorKind::Server,
            _ => ErrorKind::Unknown,
        };

        let message = body
            .and_then(|b| serde_json::from_slice::<ApiErrorResponse>(b).ok())
            .map(|e| e.error)
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| format!("HTTP error: {status}"));

        Self::new(kind, message).with_context("http_status", status.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message)?;
        if let Some(internal) = &self.internal_message {
            write!(f, " (internal: {internal})")?;
        }
        Ok(())
    }
}

impl std::error::Error for AppError {}

/// Error body returned by the catalog API, e.g. `{"error": "There is nothing here"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ApiErrorResponse {
    #[serde(default)]
    error: String,
}

pub type AppResult<T> = Result<T, AppError>;

/// Maps any capability error into a storage failure.
pub fn storage_outcome<T, E: std::fmt::Display>(result: Result<T, E>) -> AppResult<T> {
    result.map_err(|e| {
        AppError::new(ErrorKind::Storage, "key-value operation failed").with_internal(e.to_string())
    })
}

pub mod app {
    use super::*;
    use crate::capabilities::{http::page_outcome, DelayOutput};
    use crate::favorites::FavoritesError;
    use crate::listing::{FetchTicket, PageApplied};
    use tracing::{debug, info, warn};

    #[derive(Default)]
    pub struct App;

    impl App {
        /// Lifecycle entry point: hydrate favorites once; the first page
        /// follows when the stored snapshot has been read.
        fn on_start(model: &mut Model, caps: &Capabilities) {
            if model.started {
                debug!("start ignored, core already started");
                return;
            }
            model.started = true;
            info!(api = model.settings.endpoints.base(), "catalog core started");
            Self::hydrate_favorites(model, caps);
        }

        fn hydrate_favorites(model: &Model, caps: &Capabilities) {
            if model.favorites.is_hydrated() {
                debug!("favorites already hydrated");
                return;
            }
            let key = model.settings.favorites_key.raw();
            debug!(%key, "reading favorites snapshot");
            caps.key_value.get(key, |result| {
                Event::FavoritesLoaded(Box::new(storage_outcome(result)))
            });
        }

        /// Mirrors the whole favorites map to durable storage.
        fn on_favorites_changed(model: &mut Model, caps: &Capabilities) {
            let bytes = match model.favorites.encode() {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!(error = %e, "favorites snapshot not persisted");
                    model.report(AppError::from(e), Some(RetryTarget::PersistFavorites));
                    return;
                }
            };

            let key = model.settings.favorites_key.raw();
            debug!(%key, bytes = bytes.len(), "persisting favorites");
            caps.key_value.set(key, bytes, |result| {
                Event::FavoritesPersisted(Box::new(storage_outcome(result).map(|_| ())))
            });
        }

        fn load_next_page(model: &mut Model, caps: &Capabilities) {
            let Some((ticket, page)) = model.listing.begin_page_fetch() else {
                debug!(
                    in_flight = model.listing.is_in_flight(),
                    has_more = model.listing.has_more(),
                    "next page not requested"
                );
                return;
            };

            let url = model.settings.endpoints.page(page);
            debug!(page, %url, "requesting page");
            caps.http
                .get(url)
                .expect_json::<CharacterPage>()
                .send(move |result| Event::PageFetched {
                    ticket,
                    outcome: Box::new(page_outcome(result)),
                });
        }

        fn schedule_search(term: String, model: &mut Model, caps: &Capabilities) {
            let length = term.chars().count();
            let term: String = if length > MAX_SEARCH_TERM_LENGTH {
                debug!(length, max = MAX_SEARCH_TERM_LENGTH, "truncating search term");
                term.chars().take(MAX_SEARCH_TERM_LENGTH).collect()
            } else {
                term
            };
            let scheduled = model.search.schedule(term);

            if let Some(previous) = scheduled.superseded {
                debug!(timer = %previous, "cancelling superseded search timer");
                caps.delay.cancel(previous);
            }

            let timer = scheduled.timer;
            caps.delay
                .start(timer, model.settings.search_debounce_ms, move |output| {
                    Event::SearchDelayElapsed { timer, output }
                });
        }

        fn dispatch_search(term: &str, model: &mut Model, caps: &Capabilities) {
            let term = term.trim();
            if term.is_empty() {
                Self::reset_listing(model, caps);
                return;
            }

            let ticket = model.listing.begin_search(term);
            let url = model.settings.endpoints.search(term);
            info!(%term, %url, "dispatching search");
            caps.http
                .get(url)
                .expect_json::<CharacterPage>()
                .send(move |result| Event::SearchFetched {
                    ticket,
                    outcome: Box::new(page_outcome(result)),
                });
        }

        fn clear_search(model: &mut Model, caps: &Capabilities) {
            if let Some(pending) = model.search.clear() {
                debug!(timer = %pending, "cancelling pending search timer");
                caps.delay.cancel(pending);
            }
            Self::reset_listing(model, caps);
        }

        /// Drops the accumulated list and reloads the unfiltered first page.
        fn reset_listing(model: &mut Model, caps: &Capabilities) {
            model.listing.reset();
            model.resolve_failure(|target| {
                matches!(target, RetryTarget::LoadPage | RetryTarget::Search { .. })
            });
            Self::load_next_page(model, caps);
        }

        fn handle_page_fetched(
            ticket: FetchTicket,
            outcome: AppResult<CharacterPage>,
            model: &mut Model,
        ) {
            match outcome {
                Ok(page) => match model.listing.apply_page(ticket, page) {
                    PageApplied::Stale => debug!(?ticket, "stale page response dropped"),
                    PageApplied::Applied { received, has_more } => {
                        info!(
                            received,
                            total = model.listing.len(),
                            has_more,
                            "page appended"
                        );
                        model.resolve_failure(|target| *target == RetryTarget::LoadPage);
                    }
                },
                Err(error) => {
                    if model.listing.abort_fetch(ticket) {
                        warn!(?ticket, %error, "page fetch failed");
                        model.report(error, Some(RetryTarget::LoadPage));
                    } else {
                        debug!(?ticket, %error, "stale page failure dropped");
                    }
                }
            }
        }

        fn handle_search_fetched(
            ticket: FetchTicket,
            outcome: AppResult<CharacterPage>,
            model: &mut Model,
        ) {
            // The catalog answers 404 when no name matches.
            let outcome = match outcome {
                Err(error) if error.kind == ErrorKind::NotFound => Ok(CharacterPage::default()),
                other => other,
            };

            match outcome {
                Ok(page) => match model.listing.apply_search(ticket, page.results) {
                    PageApplied::Stale => debug!(?ticket, "stale search response dropped"),
                    PageApplied::Applied { received, .. } => {
                        info!(received, "search results applied");
                        model.resolve_failure(|target| matches!(target, RetryTarget::Search { .. }));
                    }
                },
                Err(error) => {
                    let term = model.listing.pending_search().map(str::to_string);
                    if model.listing.abort_fetch(ticket) {
                        warn!(?ticket, %error, "search failed");
                        let retry = term.map(|term| RetryTarget::Search { term });
                        model.report(error, retry);
                    } else {
                        debug!(?ticket, %error, "stale search failure dropped");
                    }
                }
            }
        }

        fn handle_favorites_loaded(
            outcome: AppResult<Option<Vec<u8>>>,
            model: &mut Model,
            caps: &Capabilities,
        ) {
            match outcome {
                Ok(stored) => match model.favorites.hydrate(stored.as_deref()) {
                    Ok(restored) => {
                        info!(restored, "favorites hydrated");
                        model.resolve_failure(|target| *target == RetryTarget::HydrateFavorites);
                    }
                    Err(FavoritesError::AlreadyHydrated) => {
                        debug!("duplicate favorites snapshot ignored");
                    }
                    Err(e) => {
                        warn!(error = %e, "favorites hydrate failed");
                        model.report(AppError::from(e), Some(RetryTarget::HydrateFavorites));
                    }
                },
                Err(error) => {
                    warn!(%error, "favorites snapshot could not be read");
                    model.report(error, Some(RetryTarget::HydrateFavorites));
                }
            }

            if model.listing.is_pristine() {
                Self::load_next_page(model, caps);
            }
        }

        fn toggle_favorite(id: CharacterId, model: &mut Model, caps: &Capabilities) {
            match model.favorites.toggle(id) {
                Ok(now_favorite) => {
                    debug!(%id, now_favorite, "favorite toggled");
                    Self::on_favorites_changed(model, caps);
                }
                Err(e) => warn!(%id, error = %e, "favorite toggle rejected"),
            }
        }

        fn select(id: CharacterId, model: &mut Model) {
            match model.listing.find(id) {
                Some(character) => {
                    debug!(%id, name = %character.name, "character selected");
                    model.selection = Some(character.clone());
                }
                None => warn!(%id, "selected character is not in the current list"),
            }
        }

        fn retry(model: &mut Model, caps: &Capabilities) {
            let Some(failure) = model.failure.take() else {
                debug!("nothing to retry");
                return;
            };

            if !failure.error.is_retryable() || failure.retry.is_none() {
                debug!(error = %failure.error, "failure is not retryable");
                model.failure = Some(failure);
                return;
            }
            let Some(target) = failure.retry else {
                return;
            };

            info!(?target, "retrying failed operation");
            match target {
                RetryTarget::LoadPage => Self::load_next_page(model, caps),
                RetryTarget::Search { term } => Self::dispatch_search(&term, model, caps),
                RetryTarget::HydrateFavorites => Self::hydrate_favorites(model, caps),
                RetryTarget::PersistFavorites => Self::on_favorites_changed(model, caps),
            }
        }

        fn configure(config: CatalogConfig, model: &mut Model) {
            if model.started {
                warn!("configuration ignored after start");
                return;
            }
            match CatalogSettings::try_from(config) {
                Ok(settings) => {
                    info!(api = settings.endpoints.base(), "catalog configured");
                    model.settings = settings;
                }
                Err(error) => {
                    warn!(%error, "invalid catalog configuration");
                    model.report(error, None);
                }
            }
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            let _span = tracing::debug_span!(
                "update",
                event = event.name(),
                user = event.is_user_initiated()
            )
            .entered();

            match event {
                Event::Started => Self::on_start(model, caps),

                Event::Configure(config) => Self::configure(config, model),

                Event::EndReached => Self::load_next_page(model, caps),

                Event::PageFetched { ticket, outcome } => {
                    Self::handle_page_fetched(ticket, *outcome, model);
                }

                Event::SearchChanged(term) => Self::schedule_search(term, model, caps),

                Event::SearchDelayElapsed { timer, output } => {
                    if output == DelayOutput::Cancelled {
                        debug!(%timer, "search timer cancelled by shell");
                        return;
                    }
                    match model.search.fire(timer) {
                        Some(term) => Self::dispatch_search(&term, model, caps),
                        None => {
                            debug!(%timer, "superseded search timer ignored");
                            return;
                        }
                    }
                }

                Event::SearchFetched { ticket, outcome } => {
                    Self::handle_search_fetched(ticket, *outcome, model);
                }

                Event::SearchCleared => Self::clear_search(model, caps),

                Event::FavoritesLoaded(outcome) => {
                    Self::handle_favorites_loaded(*outcome, model, caps);
                }

                Event::FavoriteToggled(id) => Self::toggle_favorite(id, model, caps),

                Event::FavoritesPersisted(outcome) => match *outcome {
                    Ok(()) => {
                        debug!("favorites persisted");
                        model.resolve_failure(|target| *target == RetryTarget::PersistFavorites);
                    }
                    Err(error) => {
                        warn!(%error, "favorites persistence failed");
                        model.report(error, Some(RetryTarget::PersistFavorites));
                    }
                },

                Event::CharacterSelected(id) => Self::select(id, model),

                Event::DetailClosed => model.selection = None,

                Event::RetryRequested => Self::retry(model, caps),

                Event::ErrorDismissed => model.failure = None,
            }

            caps.render.render();
        }

        fn view(&self, model: &Model) -> ViewModel {
            let cards = model
                .listing
                .entries()
                .iter()
                .map(|c| CharacterCard::new(c, model.favorites.is_favorite(c.id)))
                .collect();

            let detail = model
                .selection
                .as_ref()
                .map(|c| CharacterDetail::new(c, model.favorites.is_favorite(c.id)));

            ViewModel {
                cards,
                search_term: model.search.term().to_string(),
                is_loading: model.listing.is_in_flight(),
                has_more: model.listing.has_more(),
                detail,
                favorites_ready: model.favorites.is_hydrated(),
                favorite_count: model.favorites.len(),
                error: model.failure.as_ref().map(|f| {
                    UserFacingError::new(&f.error, f.retry.is_some())
                }),
            }
        }
    }
}
