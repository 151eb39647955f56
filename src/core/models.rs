use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::NewsError;

/* ----- SOURCES & CATEGORIES (shared by news/, feed/, filters/, stream/) ----- */

/// The provider a news item was sourced from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsSource {
    /// Finnhub company and market news.
    Finnhub,
    /// SEC filings.
    Sec,
    /// FRED economic releases.
    Fred,
    /// Generic RSS feeds.
    Rss,
}

impl NewsSource {
    /// All known sources, in display order.
    pub const ALL: [Self; 4] = [Self::Finnhub, Self::Sec, Self::Fred, Self::Rss];

    /// The tag used on the wire and in query strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Finnhub => "finnhub",
            Self::Sec => "sec",
            Self::Fred => "fred",
            Self::Rss => "rss",
        }
    }
}

impl fmt::Display for NewsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Finnhub => "Finnhub",
            Self::Sec => "SEC",
            Self::Fred => "FRED",
            Self::Rss => "RSS",
        })
    }
}

impl FromStr for NewsSource {
    type Err = NewsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|src| src.as_str() == s)
            .ok_or_else(|| NewsError::Data(format!("unknown news source: {s}")))
    }
}

/// The editorial category of a news item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NewsCategory {
    Company,
    General,
    Earnings,
    Market,
}

impl NewsCategory {
    /// All known categories, in display order.
    pub const ALL: [Self; 4] = [Self::Company, Self::General, Self::Earnings, Self::Market];

    /// The tag used on the wire and in query strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::General => "general",
            Self::Earnings => "earnings",
            Self::Market => "market",
        }
    }

    /// A human-readable label for filter controls.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Company => "Company news",
            Self::General => "General",
            Self::Earnings => "Earnings",
            Self::Market => "Market",
        }
    }
}

impl fmt::Display for NewsCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for NewsCategory {
    type Err = NewsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| NewsError::Data(format!("unknown news category: {s}")))
    }
}

/* ----- ITEMS & PAGES ----- */

/// A single news article. Immutable once fetched; `id` is its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    #[serde(rename = "newsId")]
    pub id: String,
    pub headline: String,
    #[serde(default)]
    pub summary: String,
    pub source: NewsSource,
    pub category: NewsCategory,
    pub url: String,
    #[serde(rename = "publishedAt")]
    pub published_at: DateTime<Utc>,
    /// Ticker symbols mentioned by the article, in server order.
    #[serde(default)]
    pub symbols: Vec<String>,
}

/// Result-set bookkeeping returned alongside every paginated response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    /// Size of the whole result set at fetch time.
    pub total: u32,
    pub limit: u32,
    pub offset: u32,
}

/// One fetched page of a feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page {
    pub items: Vec<NewsItem>,
    pub meta: PageMeta,
}

/* ----- STATS ----- */

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCount {
    pub source: NewsSource,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: NewsCategory,
    pub count: u64,
}

/// Aggregate counts over the whole news store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsStats {
    pub total: u64,
    #[serde(rename = "bySource", default)]
    pub by_source: Vec<SourceCount>,
    #[serde(rename = "byCategory", default)]
    pub by_category: Vec<CategoryCount>,
}

impl NewsStats {
    /// The first `n` source counts, in server order.
    #[must_use]
    pub fn top_sources(&self, n: usize) -> &[SourceCount] {
        &self.by_source[..n.min(self.by_source.len())]
    }
}
