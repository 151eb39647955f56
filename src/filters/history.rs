use url::Url;

use super::FilterState;

/// Where filter changes are published so they can be shared and revisited.
pub trait HistorySink {
    /// Records `state` as a new, independently revisitable entry.
    fn push(&mut self, state: &FilterState);
}

/// A browser-like history of page URLs with back/forward navigation.
#[derive(Debug, Clone)]
pub struct UrlHistory {
    entries: Vec<Url>,
    index: usize,
}

impl UrlHistory {
    /// Starts a history whose only entry is `page_url`.
    pub fn new(page_url: Url) -> Self {
        Self {
            entries: vec![page_url],
            index: 0,
        }
    }

    /// The URL of the entry currently shown.
    pub fn current(&self) -> &Url {
        &self.entries[self.index]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn back(&mut self) -> Option<FilterState> {
        self.index = self.index.checked_sub(1)?;
        Some(FilterState::from_url(self.current()))
    }

    pub fn forward(&mut self) -> Option<FilterState> {
        if self.index + 1 >= self.entries.len() {
            return None;
        }
        self.index += 1;
        Some(FilterState::from_url(self.current()))
    }
}

impl HistorySink for UrlHistory {
    fn push(&mut self, state: &FilterState) {
        let next = state.to_url(self.current());
        // a new entry discards anything ahead of the cursor
        self.entries.truncate(self.index + 1);
        self.entries.push(next);
        self.index = self.entries.len() - 1;
    }
}

/// Discards every change. Useful when no shareable history exists.
impl HistorySink for () {
    fn push(&mut self, _state: &FilterState) {}
}

/// Keeps every pushed state in memory, oldest first.
impl HistorySink for Vec<FilterState> {
    fn push(&mut self, state: &FilterState) {
        Vec::push(self, state.clone());
    }
}
