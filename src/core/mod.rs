//! Core components of the `finnews-rs` client.
//!
//! This module contains the foundational building blocks of the library, including:
//! - The main [`NewsClient`] and its builder.
//! - The primary [`NewsError`] type.
//! - Shared data models like [`NewsItem`] and [`Page`].
//! - The request wrapper that normalizes API envelopes.

/// The main client (`NewsClient`), builder, cache and retry configuration.
pub mod client;
/// The primary error type (`NewsError`) for the crate.
pub mod error;
/// Relative-time formatting for publish dates.
pub mod format;
/// Shared data models used across multiple modules (e.g., `NewsItem`, `Page`).
pub mod models;
pub(crate) mod net;
pub(crate) mod wire;

// convenient re-exports so most code can just `use crate::core::NewsClient`
pub use client::{
    Backoff, CacheMode, CachePolicy, NewsClient, NewsClientBuilder, QueryKind, RetryConfig,
};
pub use error::{ErrorKind, NewsError};
pub use models::{
    CategoryCount, NewsCategory, NewsItem, NewsSource, NewsStats, Page, PageMeta, SourceCount,
};
pub use net::ApiResponse;
