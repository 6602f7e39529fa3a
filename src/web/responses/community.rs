use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::download::DownloadItem;
use crate::models::notification::Notification;
use crate::models::post::{Post, PostStats};
use crate::models::topic::TrendingTopic;
use crate::models::user::Member;

use super::PaginationMeta;

#[derive(Serialize, Debug)]
pub struct AuthorView {
    pub id: Uuid,
    pub username: String,
    pub display_name: String,
    pub avatar: String,
    pub verified: bool,
    pub badge: Option<String>,
}

impl From<&Member> for AuthorView {
    fn from(member: &Member) -> Self {
        AuthorView {
            id: member.id,
            username: member.username.clone(),
            display_name: member.display_name.clone(),
            avatar: member.avatar.clone(),
            verified: member.verified,
            badge: member.badge.clone(),
        }
    }
}

/// Feed entry with its author resolved.
#[derive(Serialize, Debug)]
pub struct PostView {
    pub id: Uuid,
    pub author: Option<AuthorView>,
    pub content: String,
    pub image: Option<String>,
    pub stats: PostStats,
    pub liked: bool,
    pub created_at: DateTime<Utc>,
}

impl PostView {
    pub fn build(post: Post, members: &[Member]) -> Self {
        let author = members
            .iter()
            .find(|member| member.id == post.author_id)
            .map(AuthorView::from);
        PostView {
            id: post.id,
            author,
            content: post.content,
            image: post.image,
            stats: post.stats,
            liked: post.liked,
            created_at: post.created_at,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct FeedResponse {
    pub posts: Vec<PostView>,
    pub pagination: PaginationMeta,
}

#[derive(Serialize, Debug)]
pub struct TrendingResponse {
    pub topics: Vec<TrendingTopic>,
}

#[derive(Serialize, Debug)]
pub struct NotificationsResponse {
    pub notifications: Vec<Notification>,
    pub unread_count: i64,
}

#[derive(Serialize, Debug)]
pub struct LikeResponse {
    pub id: Uuid,
    pub liked: bool,
    pub likes: i64,
}

#[derive(Serialize, Debug)]
pub struct DownloadsResponse {
    pub downloads: Vec<DownloadItem>,
    pub total_speed: u64,
    pub downloading_count: i64,
    pub completed_count: i64,
}

#[derive(Serialize, Debug)]
pub struct ClearedResponse {
    pub cleared: i64,
}

#[derive(Serialize, Debug)]
pub struct MarkedResponse {
    pub marked: i64,
}
