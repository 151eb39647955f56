//! Cursor-following feeds over the list and search endpoints.
//!
//! A [`Feed`] owns the pages fetched so far for one [`FeedQuery`]. Fetching is
//! split into issuing a [`PageRequest`] and applying its [`PageOutcome`], so an
//! outcome that arrives after the feed moved on (new query, reset) is
//! recognized by its tag and discarded instead of being applied.

mod aggregate;

pub use aggregate::{ListDisplay, aggregate};

use crate::core::{
    CacheMode, ErrorKind, NewsCategory, NewsClient, NewsError, NewsItem, NewsSource, Page,
    PageMeta, QueryKind, RetryConfig,
};
use crate::filters::FilterState;
use crate::news::{DEFAULT_PAGE_SIZE, NewsListBuilder, SearchBuilder};

/// Offset of the page after `meta`, or `None` when `meta` was the last page.
pub fn next_cursor(meta: &PageMeta) -> Option<u32> {
    if meta.limit == 0 {
        return None;
    }
    let next = meta.offset.checked_add(meta.limit)?;
    (next < meta.total).then_some(next)
}

/// The offset/limit pair identifying one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    pub offset: u32,
    pub limit: u32,
}

/// Which paginated endpoint a feed follows, with its parameters.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeedQuery {
    List {
        source: Option<NewsSource>,
        category: Option<NewsCategory>,
    },
    Search {
        query: String,
    },
}

impl FeedQuery {
    /// Selects exactly one feed for `filters`: search when a query is set, the listing otherwise.
    pub fn from_filters(filters: &FilterState) -> Self {
        if filters.is_search_mode() {
            Self::Search {
                query: filters.query().to_string(),
            }
        } else {
            Self::List {
                source: filters.source(),
                category: filters.category(),
            }
        }
    }

    pub const fn kind(&self) -> QueryKind {
        match self {
            Self::List { .. } => QueryKind::List,
            Self::Search { .. } => QueryKind::Search,
        }
    }
}

/// Per-feed fetch settings.
#[derive(Debug, Clone)]
pub struct FeedOptions {
    pub limit: u32,
    pub cache_mode: CacheMode,
    pub retry: Option<RetryConfig>,
}

impl Default for FeedOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_SIZE,
            cache_mode: CacheMode::Use,
            retry: None,
        }
    }
}

/// The last fetch failure of a feed, reduced to what a view needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedError {
    pub kind: ErrorKind,
    pub status: Option<u16>,
    /// User-facing text.
    pub message: String,
}

impl From<&NewsError> for FeedError {
    fn from(e: &NewsError) -> Self {
        Self {
            kind: e.kind(),
            status: e.status(),
            message: e.user_message(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedStatus<'a> {
    /// Nothing requested yet.
    Idle,
    /// First page in flight.
    Loading,
    /// A further page in flight.
    LoadingMore,
    Ready,
    Failed(&'a FeedError),
}

/// Whether an outcome was applied to the feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Applied,
    /// The outcome belonged to a superseded query or reset and was ignored.
    Discarded,
}

/// One in-flight page fetch, tagged with everything it was issued for.
#[derive(Debug, Clone)]
pub struct PageRequest {
    client: NewsClient,
    query: FeedQuery,
    cursor: Cursor,
    epoch: u64,
    cache_mode: CacheMode,
    retry: Option<RetryConfig>,
}

impl PageRequest {
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub const fn query(&self) -> &FeedQuery {
        &self.query
    }

    /// Performs the fetch. Never touches the feed; apply the outcome with [`Feed::apply`].
    pub async fn send(self) -> PageOutcome {
        let result = match &self.query {
            FeedQuery::List { source, category } => {
                NewsListBuilder::new(&self.client)
                    .source(*source)
                    .category(*category)
                    .limit(self.cursor.limit)
                    .offset(self.cursor.offset)
                    .cache_mode(self.cache_mode)
                    .retry_policy(self.retry.clone())
                    .fetch()
                    .await
            }
            FeedQuery::Search { query } => {
                SearchBuilder::new(&self.client, query.clone())
                    .limit(self.cursor.limit)
                    .offset(self.cursor.offset)
                    .cache_mode(self.cache_mode)
                    .retry_policy(self.retry.clone())
                    .fetch()
                    .await
            }
        };

        PageOutcome {
            query: self.query,
            cursor: self.cursor,
            epoch: self.epoch,
            result,
        }
    }
}

/// The result of a [`PageRequest`], still carrying its tag.
#[derive(Debug)]
pub struct PageOutcome {
    query: FeedQuery,
    cursor: Cursor,
    epoch: u64,
    pub result: Result<Page, NewsError>,
}

impl PageOutcome {
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }
}

/// The pages fetched so far for one query, in cursor order.
#[derive(Debug)]
pub struct Feed {
    client: NewsClient,
    query: FeedQuery,
    options: FeedOptions,
    pages: Vec<Page>,
    /// `None` once the last page was applied.
    next_offset: Option<u32>,
    in_flight: Option<u32>,
    error: Option<FeedError>,
    epoch: u64,
}

impl Feed {
    pub fn new(client: &NewsClient, query: FeedQuery, options: FeedOptions) -> Self {
        Self {
            client: client.clone(),
            query,
            options,
            pages: Vec::new(),
            next_offset: Some(0),
            in_flight: None,
            error: None,
            epoch: 0,
        }
    }

    pub const fn query(&self) -> &FeedQuery {
        &self.query
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// The de-duplicated items of every page applied so far.
    pub fn items(&self) -> Vec<NewsItem> {
        aggregate(&self.pages)
    }

    /// True until a page reports that it was the last one.
    pub const fn has_next_page(&self) -> bool {
        self.next_offset.is_some()
    }

    pub const fn is_fetching(&self) -> bool {
        self.in_flight.is_some()
    }

    pub const fn error(&self) -> Option<&FeedError> {
        self.error.as_ref()
    }

    pub fn status(&self) -> FeedStatus<'_> {
        match (self.in_flight, &self.error) {
            (Some(_), _) if self.pages.is_empty() => FeedStatus::Loading,
            (Some(_), _) => FeedStatus::LoadingMore,
            (None, Some(err)) => FeedStatus::Failed(err),
            (None, None) if self.pages.is_empty() && self.next_offset == Some(0) => {
                FeedStatus::Idle
            }
            (None, None) => FeedStatus::Ready,
        }
    }

    /// Drops every page and starts over at offset 0. Outcomes issued before the
    /// reset will be discarded.
    pub fn reset(&mut self) {
        self.pages.clear();
        self.next_offset = Some(0);
        self.in_flight = None;
        self.error = None;
        self.epoch += 1;
    }

    /// Switches to another query. Returns false (and keeps the pages) if it is the same query.
    pub fn set_query(&mut self, query: FeedQuery) -> bool {
        if query == self.query {
            return false;
        }
        self.query = query;
        self.reset();
        true
    }

    /// Issues the request for the next page, or `None` when a fetch is already
    /// in flight or every page has been loaded.
    ///
    /// A request that is dropped instead of sent and applied must be released
    /// with [`cancel`](Self::cancel).
    pub fn request_next(&mut self) -> Option<PageRequest> {
        if self.in_flight.is_some() {
            return None;
        }
        let offset = self.next_offset?;
        self.in_flight = Some(offset);
        self.error = None;
        Some(PageRequest {
            client: self.client.clone(),
            query: self.query.clone(),
            cursor: Cursor {
                offset,
                limit: self.options.limit,
            },
            epoch: self.epoch,
            cache_mode: self.options.cache_mode,
            retry: self.options.retry.clone(),
        })
    }

    /// Abandons the fetch in flight, if any. Its outcome will be discarded and
    /// the same page can be requested again. Pages and errors are kept.
    pub fn cancel(&mut self) {
        if self.in_flight.take().is_some() {
            self.epoch += 1;
        }
    }

    /// Applies a finished fetch if it still matches this feed's query, epoch and cursor.
    pub fn apply(&mut self, outcome: PageOutcome) -> (Applied, Option<NewsError>) {
        if outcome.query != self.query
            || outcome.epoch != self.epoch
            || self.in_flight != Some(outcome.cursor.offset)
        {
            #[cfg(feature = "tracing")]
            tracing::debug!(offset = outcome.cursor.offset, "discarding stale page");
            return (Applied::Discarded, None);
        }

        self.in_flight = None;
        match outcome.result {
            Ok(page) => {
                self.next_offset = next_cursor(&page.meta);
                self.pages.push(page);
                (Applied::Applied, None)
            }
            Err(e) => {
                self.error = Some(FeedError::from(&e));
                (Applied::Applied, Some(e))
            }
        }
    }

    /// Fetches and applies the next page.
    ///
    /// Returns `Ok(false)` when there was nothing to fetch. Dropping the future
    /// before it completes cancels the fetch.
    ///
    /// # Errors
    ///
    /// Returns the fetch error; it is also recorded on the feed for display.
    pub async fn fetch_next(&mut self) -> Result<bool, NewsError> {
        let Some(req) = self.request_next() else {
            return Ok(false);
        };
        let mut guard = CancelOnDrop {
            feed: self,
            armed: true,
        };
        let outcome = req.send().await;
        guard.armed = false;
        match guard.feed.apply(outcome) {
            (_, Some(e)) => Err(e),
            (applied, None) => Ok(applied == Applied::Applied),
        }
    }

    pub fn display(&self) -> ListDisplay {
        ListDisplay::from_feed(self)
    }
}

/// Releases the in-flight slot when a `fetch_next` future is dropped mid-request.
struct CancelOnDrop<'a> {
    feed: &'a mut Feed,
    armed: bool,
}

impl Drop for CancelOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.feed.cancel();
        }
    }
}
