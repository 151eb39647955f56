//! Public client surface + builder.
//! Internals are split into `cache` (query cache), `retry` (policy types) and `constants` (defaults).

mod cache;
mod constants;
mod retry;

pub use cache::{CachePolicy, QueryKind};
pub use retry::{Backoff, CacheMode, RetryConfig};

pub(crate) use constants::{PATH_NEWS, PATH_SEARCH, PATH_STATS, PATH_STREAM};

use crate::core::NewsError;
use cache::CacheStore;
use constants::{BASE_URL_ENV, DEFAULT_BASE_URL, USER_AGENT};
use reqwest::{Client, RequestBuilder, Response};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Handle to the news API. Cheap to clone; clones share the HTTP pool and the query cache.
#[derive(Debug, Clone)]
pub struct NewsClient {
    http: Client,
    stream_http: Client,
    base_url: Url,
    retry: RetryConfig,
    cache: Option<Arc<CacheStore>>,
}

impl Default for NewsClient {
    fn default() -> Self {
        Self::builder().build().expect("default client")
    }
}

impl NewsClient {
    /// Create a new builder.
    pub fn builder() -> NewsClientBuilder {
        NewsClientBuilder::default()
    }

    /// The API host every endpoint path is joined onto.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /* -------- internal getters used by other modules -------- */

    pub(crate) fn http(&self) -> &Client {
        &self.http
    }

    pub(crate) fn stream_http(&self) -> &Client {
        &self.stream_http
    }

    pub(crate) fn endpoint(&self, path: &str) -> Result<Url, NewsError> {
        Ok(self.base_url.join(path)?)
    }

    /* -------- cache -------- */

    pub fn cache_enabled(&self) -> bool {
        self.cache.is_some()
    }

    pub(crate) async fn cache_get(&self, kind: QueryKind, url: &Url) -> Option<String> {
        self.cache.as_ref()?.get(kind, url).await
    }

    pub(crate) async fn cache_put(&self, kind: QueryKind, url: &Url, body: &str) {
        if let Some(store) = &self.cache {
            store.put(kind, url, body).await;
        }
    }

    /// Drops every cached response of `kind`, so the next fetch goes to the network.
    pub async fn invalidate(&self, kind: QueryKind) {
        if let Some(store) = &self.cache {
            store.invalidate(kind).await;
        }
    }

    /// Number of responses currently held in the cache.
    pub async fn cached_entries(&self) -> usize {
        match &self.cache {
            Some(store) => store.len().await,
            None => 0,
        }
    }

    /* -------- retry -------- */

    /// Sends `req`, retrying according to `retry_override` or the client's default policy.
    pub(crate) async fn send_with_retry(
        &self,
        req: RequestBuilder,
        retry_override: Option<&RetryConfig>,
    ) -> Result<Response, NewsError> {
        let cfg = retry_override.unwrap_or(&self.retry);
        let mut attempt = 0;

        loop {
            // streaming bodies can't be cloned; send them once
            let Some(this_try) = req.try_clone() else {
                return Ok(req.send().await?);
            };

            match this_try.send().await {
                Ok(resp) => {
                    let code = resp.status().as_u16();
                    if cfg.enabled
                        && attempt < cfg.max_retries
                        && cfg.retry_on_status.contains(&code)
                    {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(status = code, attempt, "retrying request");
                        tokio::time::sleep(cfg.backoff.delay(attempt)).await;
                        attempt += 1;
                        continue;
                    }
                    return Ok(resp);
                }
                Err(e) => {
                    let retryable = (e.is_timeout() && cfg.retry_on_timeout)
                        || (e.is_connect() && cfg.retry_on_connect);
                    if cfg.enabled && retryable && attempt < cfg.max_retries {
                        #[cfg(feature = "tracing")]
                        tracing::debug!(error = %e, attempt, "retrying request");
                        tokio::time::sleep(cfg.backoff.delay(attempt)).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(e.into());
                }
            }
        }
    }
}

/* ----------------------- Builder ----------------------- */

pub struct NewsClientBuilder {
    user_agent: Option<String>,
    base_url: Option<Url>,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    retry: RetryConfig,
    cache_enabled: bool,
    cache_policies: HashMap<QueryKind, CachePolicy>,
}

impl Default for NewsClientBuilder {
    fn default() -> Self {
        Self {
            user_agent: None,
            base_url: None,
            timeout: None,
            connect_timeout: None,
            retry: RetryConfig::default(),
            cache_enabled: true,
            cache_policies: HashMap::new(),
        }
    }
}

impl NewsClientBuilder {
    /// Start from the environment: `FINNEWS_API_URL` overrides the API host when set.
    ///
    /// # Errors
    ///
    /// Returns `NewsError::Url` if the variable is set but is not a valid URL.
    pub fn from_env() -> Result<Self, NewsError> {
        let mut builder = Self::default();
        if let Ok(raw) = std::env::var(BASE_URL_ENV)
            && !raw.trim().is_empty()
        {
            builder.base_url = Some(parse_base(raw.trim())?);
        }
        Ok(builder)
    }

    /// Override the API host (e.g., `https://news.example.com/`).
    ///
    /// A missing trailing slash is added so endpoint paths join underneath it.
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(with_trailing_slash(url));
        self
    }

    /// Override the User-Agent.
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Set a global request timeout (overall). Default: none.
    ///
    /// Applies to regular fetches only; the live stream keeps its connection open indefinitely.
    #[must_use]
    pub const fn timeout(mut self, dur: Duration) -> Self {
        self.timeout = Some(dur);
        self
    }

    /// Set a connect timeout. Default: none.
    #[must_use]
    pub const fn connect_timeout(mut self, dur: Duration) -> Self {
        self.connect_timeout = Some(dur);
        self
    }

    /// Replace the default retry policy used by the query layer.
    #[must_use]
    pub fn retry_config(mut self, cfg: RetryConfig) -> Self {
        self.retry = cfg;
        self
    }

    /// Enable or disable the in-memory query cache. Enabled by default.
    #[must_use]
    pub const fn cache(mut self, enabled: bool) -> Self {
        self.cache_enabled = enabled;
        self
    }

    /// Override the freshness policy of one query kind.
    #[must_use]
    pub fn cache_policy(mut self, kind: QueryKind, policy: CachePolicy) -> Self {
        self.cache_policies.insert(kind, policy);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the default base URL cannot be parsed or the HTTP client cannot be built.
    pub fn build(self) -> Result<NewsClient, NewsError> {
        let base_url = match self.base_url {
            Some(u) => u,
            None => parse_base(DEFAULT_BASE_URL)?,
        };

        let ua = self.user_agent.as_deref().unwrap_or(USER_AGENT);
        let mut httpb = reqwest::Client::builder().user_agent(ua);
        let mut streamb = reqwest::Client::builder().user_agent(ua);

        if let Some(t) = self.timeout {
            httpb = httpb.timeout(t);
        }
        if let Some(ct) = self.connect_timeout {
            httpb = httpb.connect_timeout(ct);
            streamb = streamb.connect_timeout(ct);
        }

        let http = httpb.build()?;
        let stream_http = streamb.build()?;

        Ok(NewsClient {
            http,
            stream_http,
            base_url,
            retry: self.retry,
            cache: self
                .cache_enabled
                .then(|| Arc::new(CacheStore::new(&self.cache_policies))),
        })
    }
}

fn parse_base(raw: &str) -> Result<Url, NewsError> {
    Ok(with_trailing_slash(Url::parse(raw)?))
}

fn with_trailing_slash(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
