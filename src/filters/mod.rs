//! Filter and search selection, its shareable query-string form, and the
//! store every other component reads the current scope from.

mod debounce;
mod history;

pub use debounce::{DEFAULT_DEBOUNCE, Debouncer, SearchBox};
pub use history::{HistorySink, UrlHistory};

use tokio::sync::watch;
use url::Url;

use crate::core::{NewsCategory, NewsSource};

/// The current browse/search selection.
///
/// Browse filters (`source`, `category`) and the search query are mutually
/// exclusive: a non-empty query puts the view in search mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterState {
    source: Option<NewsSource>,
    category: Option<NewsCategory>,
    query: String,
}

impl FilterState {
    pub const fn source(&self) -> Option<NewsSource> {
        self.source
    }

    pub const fn category(&self) -> Option<NewsCategory> {
        self.category
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// True when a search query is set.
    pub fn is_search_mode(&self) -> bool {
        !self.query.is_empty()
    }

    /// Sets the source, leaving category and query untouched.
    #[must_use]
    pub fn set_source(self, source: Option<NewsSource>) -> Self {
        Self { source, ..self }
    }

    /// Sets the category, leaving source and query untouched.
    #[must_use]
    pub fn set_category(self, category: Option<NewsCategory>) -> Self {
        Self { category, ..self }
    }

    /// Sets the query and clears both browse filters.
    #[must_use]
    pub fn set_search(self, query: impl Into<String>) -> Self {
        Self {
            source: None,
            category: None,
            query: query.into(),
        }
    }

    /// Clears only the query.
    #[must_use]
    pub fn clear_search(self) -> Self {
        Self {
            query: String::new(),
            ..self
        }
    }

    /// Resets everything.
    #[must_use]
    pub fn clear(self) -> Self {
        Self::default()
    }

    /// Encodes the state as `source=..&category=..&q=..`, omitting empty values.
    pub fn to_query_string(&self) -> String {
        let mut ser = url::form_urlencoded::Serializer::new(String::new());
        if let Some(s) = self.source {
            ser.append_pair("source", s.as_str());
        }
        if let Some(c) = self.category {
            ser.append_pair("category", c.as_str());
        }
        if !self.query.is_empty() {
            ser.append_pair("q", &self.query);
        }
        ser.finish()
    }

    /// Decodes a query string (with or without a leading `?`).
    ///
    /// Unknown source/category tags are ignored rather than rejected, so stale
    /// shared links still open the unfiltered view.
    pub fn from_query_string(qs: &str) -> Self {
        let qs = qs.strip_prefix('?').unwrap_or(qs);
        let mut state = Self::default();
        for (k, v) in url::form_urlencoded::parse(qs.as_bytes()) {
            match k.as_ref() {
                "source" => state.source = v.parse().ok(),
                "category" => state.category = v.parse().ok(),
                "q" => state.query = v.into_owned(),
                _ => {}
            }
        }
        state
    }

    /// Reads the state from a page URL.
    pub fn from_url(url: &Url) -> Self {
        Self::from_query_string(url.query().unwrap_or_default())
    }

    /// `base` with its query replaced by this state.
    pub fn to_url(&self, base: &Url) -> Url {
        let mut url = base.clone();
        let qs = self.to_query_string();
        url.set_query((!qs.is_empty()).then_some(qs.as_str()));
        url
    }
}

/// Owner of the current [`FilterState`].
///
/// Readers subscribe through [`FilterStore::subscribe`] and never write; every
/// distinct change is published to the history sink so it can be revisited.
pub struct FilterStore<H: HistorySink = UrlHistory> {
    tx: watch::Sender<FilterState>,
    history: H,
}

impl<H: HistorySink> FilterStore<H> {
    pub fn new(initial: FilterState, history: H) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx, history }
    }

    /// A snapshot of the current state.
    pub fn state(&self) -> FilterState {
        self.tx.borrow().clone()
    }

    /// Read-only view that observes every change.
    pub fn subscribe(&self) -> watch::Receiver<FilterState> {
        self.tx.subscribe()
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    /// Applies a transition. Returns whether the state changed; unchanged
    /// states are neither published nor pushed to history.
    pub fn update(&mut self, f: impl FnOnce(FilterState) -> FilterState) -> bool {
        let next = f(self.state());
        if next == *self.tx.borrow() {
            return false;
        }
        self.history.push(&next);
        self.tx.send_replace(next);
        true
    }

    pub fn set_source(&mut self, source: Option<NewsSource>) -> bool {
        self.update(|s| s.set_source(source))
    }

    pub fn set_category(&mut self, category: Option<NewsCategory>) -> bool {
        self.update(|s| s.set_category(category))
    }

    pub fn set_search(&mut self, query: impl Into<String>) -> bool {
        let query = query.into();
        self.update(|s| s.set_search(query))
    }

    pub fn clear_search(&mut self) -> bool {
        self.update(FilterState::clear_search)
    }

    pub fn clear(&mut self) -> bool {
        self.update(FilterState::clear)
    }

    /// Replaces the state without recording a history entry (used for back/forward).
    pub fn restore(&mut self, state: FilterState) {
        self.tx.send_replace(state);
    }
}

impl FilterStore<UrlHistory> {
    /// Starts from the filters encoded in `page_url`.
    pub fn from_url(page_url: Url) -> Self {
        let initial = FilterState::from_url(&page_url);
        Self::new(initial, UrlHistory::new(page_url))
    }

    /// Steps back in history. Returns false when already at the oldest entry.
    pub fn back(&mut self) -> bool {
        match self.history.back() {
            Some(state) => {
                self.restore(state);
                true
            }
            None => false,
        }
    }

    /// Steps forward in history. Returns false when already at the newest entry.
    pub fn forward(&mut self) -> bool {
        match self.history.forward() {
            Some(state) => {
                self.restore(state);
                true
            }
            None => false,
        }
    }
}
