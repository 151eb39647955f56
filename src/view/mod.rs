//! The news page as one unit: filters drive a feed and a live subscription.
//!
//! [`NewsView`] is the only place that reads the [`FilterStore`] and pushes
//! the result into the [`Feed`] and the [`LiveStream`]. Neither of those ever
//! writes back to the filters.

use crate::core::{NewsClient, NewsError, QueryKind};
use crate::feed::{Feed, FeedOptions, FeedQuery, ListDisplay};
use crate::filters::{FilterState, FilterStore, HistorySink, UrlHistory};
use crate::stream::{LiveStream, LiveStreamBuilder, Scope, StreamConfig, StreamState};

/// A filtered, paginated news list with a live "new items" badge.
pub struct NewsView<H: HistorySink = UrlHistory> {
    client: NewsClient,
    filters: FilterStore<H>,
    feed: Feed,
    stream: LiveStream,
    /// Whether the stream was last told to run (it is off in search mode).
    live: bool,
}

impl<H: HistorySink> NewsView<H> {
    /// Builds the view for the current filter state with default feed and stream settings.
    ///
    /// Spawns the live stream driver, so it must be called inside a tokio runtime.
    pub fn new(client: &NewsClient, filters: FilterStore<H>) -> Self {
        Self::with_config(client, filters, FeedOptions::default(), StreamConfig::default())
    }

    pub fn with_config(
        client: &NewsClient,
        filters: FilterStore<H>,
        options: FeedOptions,
        stream: StreamConfig,
    ) -> Self {
        let state = filters.state();
        let live = !state.is_search_mode();
        let feed = Feed::new(client, FeedQuery::from_filters(&state), options);
        let stream = LiveStreamBuilder::new(client)
            .scope(Scope::from_filters(&state))
            .enabled(live)
            .config(stream)
            .start();

        Self {
            client: client.clone(),
            filters,
            feed,
            stream,
            live,
        }
    }

    pub const fn filters(&self) -> &FilterStore<H> {
        &self.filters
    }

    /// Direct access for writers such as [`SearchBox`](crate::filters::SearchBox).
    /// Call [`sync`](Self::sync) afterwards.
    pub const fn filters_mut(&mut self) -> &mut FilterStore<H> {
        &mut self.filters
    }

    pub const fn feed(&self) -> &Feed {
        &self.feed
    }

    pub const fn stream(&self) -> &LiveStream {
        &self.stream
    }

    /// Applies a filter transition and re-derives the feed and the stream.
    /// Returns whether the filters changed.
    pub fn set_filters(&mut self, f: impl FnOnce(FilterState) -> FilterState) -> bool {
        let changed = self.filters.update(f);
        if changed {
            self.sync();
        }
        changed
    }

    /// Re-derives the active feed and the stream scope from the current filters.
    ///
    /// Returns whether the feed switched to a new query (its pages were dropped).
    pub fn sync(&mut self) -> bool {
        let state = self.filters.state();
        let switched = self.feed.set_query(FeedQuery::from_filters(&state));

        if state.is_search_mode() {
            if self.live {
                self.stream.disable();
                self.live = false;
            }
        } else {
            self.stream.set_scope(Scope::from_filters(&state));
            if !self.live {
                self.stream.enable();
                self.live = true;
            }
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(switched, search = state.is_search_mode(), "view synced to filters");

        switched
    }

    /// Fetches the next page of the active feed (also the retry action after an error).
    ///
    /// # Errors
    ///
    /// Returns the fetch error, which is also recorded for [`display`](Self::display).
    pub async fn load_more(&mut self) -> Result<bool, NewsError> {
        self.feed.fetch_next().await
    }

    /// The "N new items" action: drops cached list pages, starts the list
    /// over, clears the badge and fetches the first page again.
    ///
    /// A search feed is left as it is and `Ok(false)` is returned.
    ///
    /// # Errors
    ///
    /// Returns the error of the first-page fetch.
    pub async fn show_new_items(&mut self) -> Result<bool, NewsError> {
        self.client.invalidate(QueryKind::List).await;
        self.stream.acknowledge();
        if !matches!(self.feed.query(), FeedQuery::List { .. }) {
            return Ok(false);
        }
        self.feed.reset();
        self.feed.fetch_next().await
    }

    pub fn display(&self) -> ListDisplay {
        self.feed.display()
    }

    pub fn live_state(&self) -> StreamState {
        self.stream.state()
    }

    /// Stops the live stream and waits for it to wind down.
    pub async fn shutdown(self) {
        self.stream.stop().await;
    }
}

impl NewsView<UrlHistory> {
    /// Steps back through the filter history and follows it.
    pub fn back(&mut self) -> bool {
        let moved = self.filters.back();
        if moved {
            self.sync();
        }
        moved
    }

    pub fn forward(&mut self) -> bool {
        let moved = self.filters.forward();
        if moved {
            self.sync();
        }
        moved
    }
}
