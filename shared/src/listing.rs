//! Paginated character list.
//!
//! Every fetch is issued under a [`FetchTicket`]. Only the response carrying
//! the ticket currently in flight may touch the list; anything else is a
//! leftover from a list that has since been reset and is dropped.

use crate::model::{Character, CharacterId, CharacterPage};
use crate::FIRST_PAGE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTicket {
    Page { generation: u64, page: u32 },
    Search { generation: u64 },
}

impl FetchTicket {
    #[must_use]
    pub const fn generation(self) -> u64 {
        match self {
            Self::Page { generation, .. } | Self::Search { generation } => generation,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageApplied {
    Stale,
    Applied { received: usize, has_more: bool },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListingMode {
    #[default]
    Browse,
    Search {
        term: String,
    },
}

#[derive(Debug, Clone)]
pub struct ListingState {
    entries: Vec<Character>,
    next_page: u32,
    has_more: bool,
    in_flight: Option<FetchTicket>,
    generation: u64,
    mode: ListingMode,
    /// Term of the search in flight; becomes the mode once results land.
    pending_search: Option<String>,
}

impl Default for ListingState {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_page: FIRST_PAGE,
            has_more: true,
            in_flight: None,
            generation: 0,
            mode: ListingMode::Browse,
            pending_search: None,
        }
    }
}

impl ListingState {
    /// Claims the in-flight slot for the next page, if paging is possible.
    pub fn begin_page_fetch(&mut self) -> Option<(FetchTicket, u32)> {
        if self.in_flight.is_some() || !self.has_more {
            return None;
        }
        let page = self.next_page;
        let ticket = FetchTicket::Page {
            generation: self.generation,
            page,
        };
        self.in_flight = Some(ticket);
        Some((ticket, page))
    }

    pub fn apply_page(&mut self, ticket: FetchTicket, page: CharacterPage) -> PageApplied {
        if self.in_flight != Some(ticket) {
            return PageApplied::Stale;
        }
        let FetchTicket::Page { page: number, .. } = ticket else {
            return PageApplied::Stale;
        };

        self.in_flight = None;
        let received = page.results.len();
        self.has_more = page.has_next();
        self.next_page = number.saturating_add(1);
        self.entries.extend(page.results);

        PageApplied::Applied {
            received,
            has_more: self.has_more,
        }
    }

    /// Starts a new result set for `term`. Anything already in flight
    /// becomes stale. The current entries and mode stay until results land.
    pub fn begin_search(&mut self, term: &str) -> FetchTicket {
        self.generation += 1;
        let ticket = FetchTicket::Search {
            generation: self.generation,
        };
        self.in_flight = Some(ticket);
        self.pending_search = Some(term.to_string());
        ticket
    }

    /// Search results are a single page; paging stops until the next reset.
    pub fn apply_search(&mut self, ticket: FetchTicket, results: Vec<Character>) -> PageApplied {
        if self.in_flight != Some(ticket) || !matches!(ticket, FetchTicket::Search { .. }) {
            return PageApplied::Stale;
        }

        self.in_flight = None;
        self.has_more = false;
        if let Some(term) = self.pending_search.take() {
            self.mode = ListingMode::Search { term };
        }
        let received = results.len();
        self.entries = results;

        PageApplied::Applied {
            received,
            has_more: false,
        }
    }

    /// Releases the in-flight slot after a failure. Returns false for a
    /// ticket that no longer owns it.
    pub fn abort_fetch(&mut self, ticket: FetchTicket) -> bool {
        if self.in_flight == Some(ticket) {
            self.in_flight = None;
            self.pending_search = None;
            true
        } else {
            false
        }
    }

    pub fn reset(&mut self) {
        self.generation += 1;
        self.entries.clear();
        self.next_page = FIRST_PAGE;
        self.has_more = true;
        self.in_flight = None;
        self.mode = ListingMode::Browse;
        self.pending_search = None;
    }

    /// Nothing loaded, nothing requested.
    #[must_use]
    pub fn is_pristine(&self) -> bool {
        self.entries.is_empty()
            && self.in_flight.is_none()
            && self.next_page == FIRST_PAGE
            && self.mode == ListingMode::Browse
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    #[must_use]
    pub fn in_flight(&self) -> Option<FetchTicket> {
        self.in_flight
    }

    #[must_use]
    pub fn has_more(&self) -> bool {
        self.has_more
    }

    #[must_use]
    pub fn next_page(&self) -> u32 {
        self.next_page
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
    pub fn entries(&self) -> &[Character] {
        &self.entries
    }

    #[must_use]
    pub fn find(&self, id: CharacterId) -> Option<&Character> {
        self.entries.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn mode(&self) -> &ListingMode {
        &self.mode
    }

    #[must_use]
    pub fn pending_search(&self) -> Option<&str> {
        self.pending_search.as_deref()
    }

    /// Term behind the entries currently shown, if they are search results.
    #[must_use]
    pub fn search_term(&self) -> Option<&str> {
        match &self.mode {
            ListingMode::Search { term } => Some(term),
            ListingMode::Browse => None,
        }
    }
}
