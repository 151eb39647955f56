//! finnews-rs: ergonomic client for a financial news API.
//!
//! The crate covers the stateful parts of a news reader:
//! - [`NewsClient`] with a response cache and a retry policy, plus builders
//!   for the listing, search, detail and stats endpoints.
//! - [`Feed`], a cursor-following list that discards stale pages and
//!   de-duplicates items across pages.
//! - [`FilterState`] / [`FilterStore`], the browse and search selection with
//!   shareable URL history and a debounced [`SearchBox`].
//! - [`LiveStream`], a reconnecting server-sent-events subscription that
//!   counts unseen items.
//! - [`NewsView`], which wires the pieces together.
//!
//! ```no_run
//! use finnews_rs::{NewsClient, NewsSource};
//!
//! # async fn run() -> Result<(), finnews_rs::NewsError> {
//! let client = NewsClient::builder().build()?;
//! let page = client.news().source(Some(NewsSource::Sec)).fetch().await?;
//! for item in &page.items {
//!     println!("{} ({})", item.headline, item.source);
//! }
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod feed;
pub mod filters;
pub mod news;
pub mod stream;
pub mod view;

pub use crate::core::format::format_relative;
pub use crate::core::{
    ApiResponse, Backoff, CacheMode, CachePolicy, CategoryCount, ErrorKind, NewsCategory,
    NewsClient, NewsClientBuilder, NewsError, NewsItem, NewsSource, NewsStats, Page, PageMeta,
    QueryKind, RetryConfig, SourceCount,
};
pub use feed::{Feed, FeedError, FeedOptions, FeedQuery, FeedStatus, ListDisplay, aggregate};
pub use filters::{FilterState, FilterStore, HistorySink, SearchBox, UrlHistory};
pub use news::{DetailBuilder, NewsListBuilder, SearchBuilder};
pub use stream::{
    LiveStream, LiveStreamBuilder, Phase, Scope, StreamConfig, StreamError, StreamState,
};
pub use view::NewsView;
