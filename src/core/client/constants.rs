//! Centralized constants for default endpoints and UA.

pub(crate) const USER_AGENT: &str = concat!("finnews-rs/", env!("CARGO_PKG_VERSION"));

/// Local development API host.
pub(crate) const DEFAULT_BASE_URL: &str = "http://localhost:3000/";

/// Environment variable that overrides the API host in `NewsClientBuilder::from_env`.
pub(crate) const BASE_URL_ENV: &str = "FINNEWS_API_URL";

pub(crate) const PATH_NEWS: &str = "api/v1/news";
pub(crate) const PATH_SEARCH: &str = "api/v1/news/search";
pub(crate) const PATH_STATS: &str = "api/v1/news/stats";
pub(crate) const PATH_STREAM: &str = "api/v1/news/stream";
