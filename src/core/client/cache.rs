//! In-memory query cache keyed by query kind and full request URL.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;
use url::Url;

/// The families of cached queries. Each family has its own freshness policy
/// and can be invalidated as a whole.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryKind {
    /// Paginated, filtered news listing.
    List,
    /// Paginated full-text search.
    Search,
    /// A single item by id.
    Detail,
    /// Aggregate counts.
    Stats,
}

impl QueryKind {
    /// The freshness policy used when none was configured on the builder.
    #[must_use]
    pub const fn default_policy(self) -> CachePolicy {
        match self {
            Self::List | Self::Search => {
                CachePolicy::new(Duration::from_secs(30), Duration::from_secs(5 * 60))
            }
            // items never change once published
            Self::Detail => {
                CachePolicy::new(Duration::from_secs(5 * 60), Duration::from_secs(30 * 60))
            }
            Self::Stats => CachePolicy::new(Duration::from_secs(60), Duration::from_secs(10 * 60)),
        }
    }
}

/// How long a cached response stays usable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CachePolicy {
    /// Entries younger than this are served without touching the network.
    pub stale_time: Duration,
    /// Entries not read for this long are evicted.
    pub gc_time: Duration,
}

impl CachePolicy {
    #[must_use]
    pub const fn new(stale_time: Duration, gc_time: Duration) -> Self {
        Self {
            stale_time,
            gc_time,
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    body: String,
    fetched_at: Instant,
    last_read: Instant,
}

#[derive(Debug)]
pub(crate) struct CacheStore {
    map: RwLock<HashMap<(QueryKind, String), CacheEntry>>,
    policies: HashMap<QueryKind, CachePolicy>,
}

impl CacheStore {
    pub(crate) fn new(overrides: &HashMap<QueryKind, CachePolicy>) -> Self {
        let policies = [
            QueryKind::List,
            QueryKind::Search,
            QueryKind::Detail,
            QueryKind::Stats,
        ]
        .into_iter()
        .map(|k| (k, overrides.get(&k).copied().unwrap_or(k.default_policy())))
        .collect();

        Self {
            map: RwLock::new(HashMap::new()),
            policies,
        }
    }

    fn policy(&self, kind: QueryKind) -> CachePolicy {
        self.policies
            .get(&kind)
            .copied()
            .unwrap_or(kind.default_policy())
    }

    pub(crate) async fn get(&self, kind: QueryKind, url: &Url) -> Option<String> {
        let policy = self.policy(kind);
        let now = Instant::now();
        let mut guard = self.map.write().await;
        let entry = guard.get_mut(&(kind, url.as_str().to_string()))?;
        if now.duration_since(entry.fetched_at) > policy.stale_time {
            return None;
        }
        entry.last_read = now;
        Some(entry.body.clone())
    }

    pub(crate) async fn put(&self, kind: QueryKind, url: &Url, body: &str) {
        let now = Instant::now();
        let mut guard = self.map.write().await;
        guard.retain(|(k, _), entry| now.duration_since(entry.last_read) <= self.policy(*k).gc_time);
        guard.insert(
            (kind, url.as_str().to_string()),
            CacheEntry {
                body: body.to_string(),
                fetched_at: now,
                last_read: now,
            },
        );
    }

    pub(crate) async fn invalidate(&self, kind: QueryKind) {
        self.map.write().await.retain(|(k, _), _| *k != kind);
    }

    pub(crate) async fn len(&self) -> usize {
        self.map.read().await.len()
    }
}
