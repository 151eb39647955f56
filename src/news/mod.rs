mod api;

use crate::core::{
    CacheMode, NewsCategory, NewsClient, NewsError, NewsItem, NewsSource, NewsStats, Page,
    RetryConfig,
};

/// Page size used when none is given.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Fetches a single news item by id.
///
/// # Errors
///
/// Returns `NewsError` if the request fails or the item does not exist.
pub async fn news_detail(client: &NewsClient, id: &str) -> Result<NewsItem, NewsError> {
    api::fetch_detail(client, id, CacheMode::Use, None).await
}

/// Fetches aggregate counts by source and category.
///
/// # Errors
///
/// Returns `NewsError` if the request fails or the response cannot be parsed.
pub async fn news_stats(client: &NewsClient) -> Result<NewsStats, NewsError> {
    api::fetch_stats(client, CacheMode::Use, None).await
}

/// A builder for one page of the filtered news listing.
#[derive(Debug, Clone)]
pub struct NewsListBuilder {
    client: NewsClient,
    source: Option<NewsSource>,
    category: Option<NewsCategory>,
    limit: u32,
    offset: u32,
    cache_mode: CacheMode,
    retry_override: Option<RetryConfig>,
}

impl NewsListBuilder {
    /// Creates a builder for the first page of the unfiltered listing.
    pub fn new(client: &NewsClient) -> Self {
        Self {
            client: client.clone(),
            source: None,
            category: None,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
            cache_mode: CacheMode::Use,
            retry_override: None,
        }
    }

    /// Restricts the listing to one source (`None` = all sources).
    #[must_use]
    pub const fn source(mut self, source: Option<NewsSource>) -> Self {
        self.source = source;
        self
    }

    /// Restricts the listing to one category (`None` = all categories).
    #[must_use]
    pub const fn category(mut self, category: Option<NewsCategory>) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub const fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Sets the cache mode for this specific API call.
    #[must_use]
    pub const fn cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    /// Overrides the default retry policy for this specific API call.
    #[must_use]
    pub fn retry_policy(mut self, cfg: Option<RetryConfig>) -> Self {
        self.retry_override = cfg;
        self
    }

    /// Executes the request.
    ///
    /// # Errors
    ///
    /// Returns a `NewsError` if the request fails, the API reports a failure,
    /// or the response has no pagination meta.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err, fields(offset = self.offset, limit = self.limit)))]
    pub async fn fetch(self) -> Result<Page, NewsError> {
        api::fetch_list(
            &self.client,
            self.source,
            self.category,
            self.limit,
            self.offset,
            self.cache_mode,
            self.retry_override.as_ref(),
        )
        .await
    }
}

/// A builder for one page of full-text search results.
#[derive(Debug, Clone)]
pub struct SearchBuilder {
    client: NewsClient,
    query: String,
    limit: u32,
    offset: u32,
    cache_mode: CacheMode,
    retry_override: Option<RetryConfig>,
}

impl SearchBuilder {
    /// Creates a `SearchBuilder` for the first page of results for `query`.
    pub fn new(client: &NewsClient, query: impl Into<String>) -> Self {
        Self {
            client: client.clone(),
            query: query.into(),
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
            cache_mode: CacheMode::Use,
            retry_override: None,
        }
    }

    #[must_use]
    pub const fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    #[must_use]
    pub const fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Sets the cache mode for this specific API call.
    #[must_use]
    pub const fn cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    /// Overrides the default retry policy for this specific API call.
    #[must_use]
    pub fn retry_policy(mut self, cfg: Option<RetryConfig>) -> Self {
        self.retry_override = cfg;
        self
    }

    /// Executes the search.
    ///
    /// An empty (or whitespace-only) query is rejected without touching the network.
    ///
    /// # Errors
    ///
    /// Returns `NewsError::Data` for an empty query, otherwise any error of the request itself.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err, fields(q = %self.query, offset = self.offset)))]
    pub async fn fetch(self) -> Result<Page, NewsError> {
        if self.query.trim().is_empty() {
            return Err(NewsError::Data("search: query must not be empty".into()));
        }
        api::fetch_search(
            &self.client,
            &self.query,
            self.limit,
            self.offset,
            self.cache_mode,
            self.retry_override.as_ref(),
        )
        .await
    }
}

/// A builder for the detail view of one item, for callers that need cache or retry control.
#[derive(Debug, Clone)]
pub struct DetailBuilder {
    client: NewsClient,
    id: String,
    cache_mode: CacheMode,
    retry_override: Option<RetryConfig>,
}

impl DetailBuilder {
    pub fn new(client: &NewsClient, id: impl Into<String>) -> Self {
        Self {
            client: client.clone(),
            id: id.into(),
            cache_mode: CacheMode::Use,
            retry_override: None,
        }
    }

    /// Sets the cache mode for this specific API call.
    #[must_use]
    pub const fn cache_mode(mut self, mode: CacheMode) -> Self {
        self.cache_mode = mode;
        self
    }

    /// Overrides the default retry policy for this specific API call.
    #[must_use]
    pub fn retry_policy(mut self, cfg: Option<RetryConfig>) -> Self {
        self.retry_override = cfg;
        self
    }

    /// # Errors
    ///
    /// Returns a `NewsError` if the request fails or the item cannot be parsed.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err, fields(id = %self.id)))]
    pub async fn fetch(self) -> Result<NewsItem, NewsError> {
        api::fetch_detail(
            &self.client,
            &self.id,
            self.cache_mode,
            self.retry_override.as_ref(),
        )
        .await
    }
}

impl NewsClient {
    /// Starts a listing request.
    pub fn news(&self) -> NewsListBuilder {
        NewsListBuilder::new(self)
    }

    /// Starts a search request.
    pub fn search(&self, query: impl Into<String>) -> SearchBuilder {
        SearchBuilder::new(self, query)
    }

    /// Fetches one item by id.
    ///
    /// # Errors
    ///
    /// See [`news_detail`].
    pub async fn news_detail(&self, id: &str) -> Result<NewsItem, NewsError> {
        news_detail(self, id).await
    }

    /// Fetches aggregate counts.
    ///
    /// # Errors
    ///
    /// See [`news_stats`].
    pub async fn news_stats(&self) -> Result<NewsStats, NewsError> {
        news_stats(self).await
    }
}
