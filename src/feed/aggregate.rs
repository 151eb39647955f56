use std::collections::HashSet;

use crate::core::{NewsItem, Page};

use super::{Feed, FeedStatus};

/// Flattens pages (oldest first) into one list, keeping only the first item seen for each id.
///
/// Always recomputed from the full page sequence; never patched incrementally.
pub fn aggregate(pages: &[Page]) -> Vec<NewsItem> {
    let mut seen = HashSet::new();
    pages
        .iter()
        .flat_map(|p| &p.items)
        .filter(|item| seen.insert(item.id.as_str()))
        .cloned()
        .collect()
}

/// What a list view should render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListDisplay {
    /// Nothing fetched yet; show placeholders.
    Loading,
    /// The feed failed; show `message` and a retry action.
    Error { message: String },
    /// Fetched successfully but nothing matched.
    Empty,
    Items {
        items: Vec<NewsItem>,
        /// False once every page has been loaded ("all news loaded").
        has_more: bool,
        /// A further page is in flight.
        loading_more: bool,
    },
}

impl ListDisplay {
    pub fn from_feed(feed: &Feed) -> Self {
        match feed.status() {
            FeedStatus::Idle | FeedStatus::Loading => Self::Loading,
            FeedStatus::Failed(err) => Self::Error {
                message: err.message.clone(),
            },
            FeedStatus::Ready | FeedStatus::LoadingMore => {
                let items = feed.items();
                if items.is_empty() {
                    Self::Empty
                } else {
                    Self::Items {
                        items,
                        has_more: feed.has_next_page(),
                        loading_more: matches!(feed.status(), FeedStatus::LoadingMore),
                    }
                }
            }
        }
    }
}
