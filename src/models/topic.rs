use serde::Serialize;
use uuid::Uuid;

use super::store::ContentStore;

#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Same,
}

/// Hashtag climbing (or sliding down) the sidebar.
#[derive(Clone, Serialize, Debug)]
pub struct TrendingTopic {
    pub id: Uuid,
    pub tag: String,
    pub posts: i64,
    pub change: TrendDirection,
    pub category: String,
}

#[derive(Clone, Serialize, Debug)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub posts: i64,
}

pub async fn list_trending(store: &ContentStore) -> Vec<TrendingTopic> {
    let mut topics = store.topics.read().await.clone();
    topics.sort_by(|a, b| b.posts.cmp(&a.posts));
    topics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::store::test_store;

    #[tokio::test]
    async fn trending_is_ordered_by_post_count() {
        let store = test_store();
        let topics = list_trending(&store).await;

        assert!(!topics.is_empty());
        for pair in topics.windows(2) {
            assert!(pair[0].posts >= pair[1].posts);
        }
    }
}
