pub mod controller;
pub mod dispatcher;
pub mod recent;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use controller::{Key, SearchAction, SearchBox, SearchOptions, SearchState};
pub use dispatcher::LatestWins;
pub use recent::{JsonFileStore, MemoryStore, RecentSearches, RecentStore};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SearchResultKind {
    User,
    Post,
    Topic,
    Tag,
}

impl SearchResultKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchResultKind::User => "user",
            SearchResultKind::Post => "post",
            SearchResultKind::Topic => "topic",
            SearchResultKind::Tag => "tag",
        }
    }
}

/// One entry in the result dropdown. Produced fresh per query, never stored.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub id: String,
    pub kind: SearchResultKind,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub url: String,
}

#[derive(Debug)]
pub enum SearchError {
    /// Superseded by a newer invocation; never surfaced to the user.
    Cancelled,
    Failed(anyhow::Error),
}

impl SearchError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, SearchError::Cancelled)
    }
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::Cancelled => write!(f, "search cancelled"),
            SearchError::Failed(err) => write!(f, "search failed: {}", err),
        }
    }
}

/// The injected lookup operation. The component defines no transport; callers
/// decide where results come from.
#[async_trait]
pub trait Searcher: Send + Sync {
    async fn search(&self, query: &str) -> anyhow::Result<Vec<SearchResult>>;
}
