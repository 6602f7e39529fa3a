use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::store::ContentStore;

#[derive(Clone, Copy, Serialize, Debug, Default)]
pub struct PostStats {
    pub likes: i64,
    pub comments: i64,
    pub shares: i64,
    pub views: i64,
}

/// One entry in the community feed.
#[derive(Clone, Serialize, Debug)]
pub struct Post {
    pub id: Uuid,
    pub author_id: Uuid,
    pub content: String,
    pub image: Option<String>,
    pub stats: PostStats,
    pub liked: bool,
    pub bookmarked: bool,
    pub created_at: DateTime<Utc>,
}

/// Feed page, newest first. The second value reports whether more posts exist
/// past this page.
pub async fn list_feed(store: &ContentStore, limit: i64, offset: i64) -> (Vec<Post>, bool) {
    let posts = store.posts.read().await;

    let mut ordered: Vec<Post> = posts.clone();
    ordered.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    let offset = offset.max(0) as usize;
    let limit = limit.max(0) as usize;
    let has_more = ordered.len() > offset + limit;
    let page = ordered.into_iter().skip(offset).take(limit).collect();

    (page, has_more)
}

pub async fn find_post_by_id(store: &ContentStore, id: Uuid) -> Option<Post> {
    store
        .posts
        .read()
        .await
        .iter()
        .find(|post| post.id == id)
        .cloned()
}

/// Flip the liked flag and adjust the counter with it.
pub async fn toggle_like(store: &ContentStore, id: Uuid) -> Result<Post> {
    let mut posts = store.posts.write().await;
    let post = posts
        .iter_mut()
        .find(|post| post.id == id)
        .ok_or_else(|| anyhow::anyhow!("post not found"))?;

    if post.liked {
        post.liked = false;
        post.stats.likes -= 1;
    } else {
        post.liked = true;
        post.stats.likes += 1;
    }

    Ok(post.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::store::test_store;

    #[tokio::test]
    async fn feed_pages_are_newest_first() {
        let store = test_store();
        let (page, _) = list_feed(&store, 10, 0).await;

        assert!(!page.is_empty());
        for pair in page.windows(2) {
            assert!(pair[0].created_at >= pair[1].created_at);
        }
    }

    #[tokio::test]
    async fn feed_reports_has_more() {
        let store = test_store();
        let total = store.posts.read().await.len() as i64;

        let (page, has_more) = list_feed(&store, total - 1, 0).await;
        assert_eq!(page.len() as i64, total - 1);
        assert!(has_more);

        let (_, has_more) = list_feed(&store, total, 0).await;
        assert!(!has_more);
    }

    #[tokio::test]
    async fn like_toggles_both_ways() {
        let store = test_store();
        let post = store.posts.read().await[0].clone();
        let before = post.stats.likes;

        let liked = toggle_like(&store, post.id).await.unwrap();
        assert!(liked.liked);
        assert_eq!(liked.stats.likes, before + 1);

        let unliked = toggle_like(&store, post.id).await.unwrap();
        assert!(!unliked.liked);
        assert_eq!(unliked.stats.likes, before);
    }
}
