use crate::capabilities::TimerId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub timer: TimerId,
    pub superseded: Option<TimerId>,
}

/// Debounce bookkeeping for the search box. Only the most recently
/// scheduled timer may dispatch.
#[derive(Debug, Clone, Default)]
pub struct SearchState {
    term: String,
    pending: Option<TimerId>,
    issued: u64,
}

impl SearchState {
    pub fn schedule(&mut self, term: String) -> Scheduled {
        self.issued += 1;
        let timer = TimerId(self.issued);
        self.term = term;
        let superseded = self.pending.replace(timer);
        Scheduled { timer, superseded }
    }

    /// Consumes the pending timer, returning the term it should dispatch.
    pub fn fire(&mut self, timer: TimerId) -> Option<String> {
        if self.pending != Some(timer) {
            return None;
        }
        self.pending = None;
        Some(self.term.clone())
    }

    pub fn clear(&mut self) -> Option<TimerId> {
        self.term.clear();
        self.pending.take()
    }

    #[must_use]
    pub fn term(&self) -> &str {
        &self.term
    }

    #[must_use]
    pub fn pending(&self) -> Option<TimerId> {
        self.pending
    }
}
