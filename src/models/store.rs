use async_trait::async_trait;
use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::search::{SearchResult, SearchResultKind, Searcher};

use super::download::{DownloadItem, DownloadStatus};
use super::notification::{Notification, NotificationKind};
use super::post::{Post, PostStats};
use super::product::Product;
use super::topic::{Tag, TrendDirection, TrendingTopic};
use super::user::{AdminUser, Member, Role};

/// Everything the site serves, held in memory. Mutation always goes through
/// the model functions; handlers never touch the tables directly.
#[derive(Debug)]
pub struct ContentStore {
    pub members: RwLock<Vec<Member>>,
    pub posts: RwLock<Vec<Post>>,
    pub topics: RwLock<Vec<TrendingTopic>>,
    pub tags: RwLock<Vec<Tag>>,
    pub notifications: RwLock<Vec<Notification>>,
    pub downloads: RwLock<Vec<DownloadItem>>,
    pub products: RwLock<Vec<Product>>,
    pub admin_users: RwLock<Vec<AdminUser>>,
}

impl ContentStore {
    /// Demo dataset plus the configured admin account.
    pub fn seeded(admin: AdminUser) -> Self {
        let sarah = Member {
            id: Uuid::new_v4(),
            username: "sarahj".to_string(),
            display_name: "Sarah Johnson".to_string(),
            avatar: "https://i.pravatar.cc/150?u=1".to_string(),
            verified: true,
            badge: Some("Top Contributor".to_string()),
        };
        let chen = Member {
            id: Uuid::new_v4(),
            username: "chenwei".to_string(),
            display_name: "Chen Wei".to_string(),
            avatar: "https://i.pravatar.cc/150?u=2".to_string(),
            verified: false,
            badge: None,
        };
        let john = Member {
            id: Uuid::new_v4(),
            username: "johndoe".to_string(),
            display_name: "John Doe".to_string(),
            avatar: "https://i.pravatar.cc/150?u=3".to_string(),
            verified: true,
            badge: None,
        };

        let posts = vec![
            Post {
                id: Uuid::new_v4(),
                author_id: sarah.id,
                content: "Just finished building an amazing community platform! The team has \
                          been working tirelessly for months. What features would you like to \
                          see next?"
                    .to_string(),
                image: Some("/static/images/education1.jpeg".to_string()),
                stats: PostStats {
                    likes: 1250,
                    comments: 340,
                    shares: 89,
                    views: 15000,
                },
                liked: false,
                bookmarked: false,
                created_at: Utc::now() - Duration::hours(2),
            },
            Post {
                id: Uuid::new_v4(),
                author_id: chen.id,
                content: "The performance optimizations are incredible! We're handling over 1 \
                          million requests per second."
                    .to_string(),
                image: None,
                stats: PostStats {
                    likes: 890,
                    comments: 120,
                    shares: 45,
                    views: 8500,
                },
                liked: true,
                bookmarked: false,
                created_at: Utc::now() - Duration::hours(5),
            },
        ];

        let topics = vec![
            trending("#WebDevelopment", 15420, TrendDirection::Up, "Tech"),
            trending("#ReactJS", 12350, TrendDirection::Up, "Framework"),
            trending("#NextJS", 10280, TrendDirection::Same, "Framework"),
            trending("#Community", 8940, TrendDirection::Down, "Social"),
            trending("#TypeScript", 7650, TrendDirection::Up, "Language"),
        ];

        let tags = vec![
            tag("community", 8940),
            tag("tutorial", 1240),
            tag("performance", 860),
            tag("opensource", 530),
        ];

        let notifications = vec![
            Notification {
                id: Uuid::new_v4(),
                kind: NotificationKind::Like,
                title: "Sarah Johnson liked your post".to_string(),
                message: "Your post \"Building scalable systems\" received a like!".to_string(),
                avatar: Some("https://i.pravatar.cc/150?u=1".to_string()),
                link: "/posts/123".to_string(),
                read: false,
                action_url: None,
                action_label: None,
                created_at: Utc::now() - Duration::minutes(5),
            },
            Notification {
                id: Uuid::new_v4(),
                kind: NotificationKind::Comment,
                title: "New comment on your post".to_string(),
                message: "Alex replied: \"Great insights! Can you share more details?\""
                    .to_string(),
                avatar: Some("https://i.pravatar.cc/150?u=3".to_string()),
                link: "/posts/123".to_string(),
                read: false,
                action_url: None,
                action_label: None,
                created_at: Utc::now() - Duration::minutes(15),
            },
            Notification {
                id: Uuid::new_v4(),
                kind: NotificationKind::Badge,
                title: "You earned a new badge!".to_string(),
                message: "Congratulations! You've earned \"Early Adopter\"".to_string(),
                avatar: None,
                link: "/profile/badges".to_string(),
                read: false,
                action_url: Some("/profile/badges/claim".to_string()),
                action_label: Some("Claim".to_string()),
                created_at: Utc::now() - Duration::hours(1),
            },
        ];

        let downloads = vec![
            DownloadItem {
                id: Uuid::new_v4(),
                name: "Community Platform Setup Guide.pdf".to_string(),
                size: 15_728_640,
                downloaded: 11_721_505,
                speed: 5_242_880,
                status: DownloadStatus::Downloading,
                url: "/downloads/guide.pdf".to_string(),
                thumbnail: Some("/static/images/education2.jpeg".to_string()),
                category: Some("Guides".to_string()),
            },
            DownloadItem {
                id: Uuid::new_v4(),
                name: "API Documentation v2.0.epub".to_string(),
                size: 5_242_880,
                downloaded: 5_242_880,
                speed: 0,
                status: DownloadStatus::Completed,
                url: "/downloads/api-docs.epub".to_string(),
                thumbnail: Some("/static/images/education4.jpeg".to_string()),
                category: Some("Docs".to_string()),
            },
            DownloadItem {
                id: Uuid::new_v4(),
                name: "Localization Starter Pack.zip".to_string(),
                size: 9_437_184,
                downloaded: 1_048_576,
                speed: 0,
                status: DownloadStatus::Failed,
                url: "/downloads/l10n-pack.zip".to_string(),
                thumbnail: None,
                category: Some("Tools".to_string()),
            },
        ];

        let products = vec![
            Product::new(
                "Community Platform",
                "Self-hosted community feed with moderation tools.",
                "Platform",
                49_900,
                Some("/static/images/product1.jpeg".to_string()),
            ),
            Product::new(
                "Education Suite",
                "Course material hosting for schools and training centers.",
                "Education",
                29_900,
                Some("/static/images/product2.jpeg".to_string()),
            ),
            Product::new(
                "Translation Toolkit",
                "Workflow for maintaining multilingual content bundles.",
                "Tools",
                9_900,
                None,
            ),
            Product::new(
                "Support Desk",
                "Shared inbox and knowledge base for customer teams.",
                "Platform",
                19_900,
                None,
            ),
        ];

        let admin_users = vec![
            admin,
            AdminUser::new(
                "maria",
                "unset",
                "Maria Keo",
                "maria@example.com",
                Role::Editor,
            ),
            {
                let mut inactive = AdminUser::new(
                    "lee",
                    "unset",
                    "Lee Somchai",
                    "lee@example.com",
                    Role::Editor,
                );
                inactive.deleted_at = Some(Utc::now() - Duration::days(30));
                inactive
            },
        ];

        Self {
            members: RwLock::new(vec![sarah, chen, john]),
            posts: RwLock::new(posts),
            topics: RwLock::new(topics),
            tags: RwLock::new(tags),
            notifications: RwLock::new(notifications),
            downloads: RwLock::new(downloads),
            products: RwLock::new(products),
            admin_users: RwLock::new(admin_users),
        }
    }
}

fn trending(tag: &str, posts: i64, change: TrendDirection, category: &str) -> TrendingTopic {
    TrendingTopic {
        id: Uuid::new_v4(),
        tag: tag.to_string(),
        posts,
        change,
        category: category.to_string(),
    }
}

fn tag(name: &str, posts: i64) -> Tag {
    Tag {
        id: Uuid::new_v4(),
        name: name.to_string(),
        posts,
    }
}

/// Case-insensitive substring search over users, posts, topics and tags.
/// Prefix matches rank ahead of plain substring matches, mirroring how the
/// result dropdown orders entries.
pub async fn search_content(store: &ContentStore, query: &str, limit: usize) -> Vec<SearchResult> {
    let needle = query.trim().trim_start_matches('#').to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    // (rank, kind order, title) sorting key alongside each hit
    let mut hits: Vec<(u8, u8, SearchResult)> = Vec::new();

    for member in store.members.read().await.iter() {
        let rank = match_rank(&needle, &[&member.username, &member.display_name]);
        if let Some(rank) = rank {
            hits.push((
                rank,
                0,
                SearchResult {
                    id: member.id.to_string(),
                    kind: SearchResultKind::User,
                    title: member.display_name.clone(),
                    subtitle: Some(format!("@{}", member.username)),
                    thumbnail: Some(member.avatar.clone()),
                    url: format!("/profile/{}", member.username),
                },
            ));
        }
    }

    let members = store.members.read().await;
    for post in store.posts.read().await.iter() {
        if let Some(rank) = match_rank(&needle, &[&post.content]) {
            let author = members.iter().find(|member| member.id == post.author_id);
            hits.push((
                rank,
                1,
                SearchResult {
                    id: post.id.to_string(),
                    kind: SearchResultKind::Post,
                    title: excerpt(&post.content, 60),
                    subtitle: author.map(|member| member.display_name.clone()),
                    thumbnail: post.image.clone(),
                    url: format!("/posts/{}", post.id),
                },
            ));
        }
    }
    drop(members);

    for topic in store.topics.read().await.iter() {
        let bare = topic.tag.trim_start_matches('#');
        if let Some(rank) = match_rank(&needle, &[bare]) {
            hits.push((
                rank,
                2,
                SearchResult {
                    id: topic.id.to_string(),
                    kind: SearchResultKind::Topic,
                    title: topic.tag.clone(),
                    subtitle: Some(topic.category.clone()),
                    thumbnail: None,
                    url: format!("/community/topics/{}", bare.to_lowercase()),
                },
            ));
        }
    }

    for tag in store.tags.read().await.iter() {
        if let Some(rank) = match_rank(&needle, &[&tag.name]) {
            hits.push((
                rank,
                3,
                SearchResult {
                    id: tag.id.to_string(),
                    kind: SearchResultKind::Tag,
                    title: format!("#{}", tag.name),
                    subtitle: Some(format!("{} posts", tag.posts)),
                    thumbnail: None,
                    url: format!("/search?q={}", urlencoding::encode(&tag.name)),
                },
            ));
        }
    }

    hits.sort_by(|a, b| (a.0, a.1, &a.2.title).cmp(&(b.0, b.1, &b.2.title)));
    hits.into_iter().map(|(_, _, hit)| hit).take(limit).collect()
}

fn match_rank(needle: &str, haystacks: &[&str]) -> Option<u8> {
    let mut best: Option<u8> = None;
    for haystack in haystacks {
        let haystack = haystack.to_lowercase();
        if haystack.starts_with(needle) {
            return Some(0);
        }
        if haystack.contains(needle) {
            best = Some(1);
        }
    }
    best
}

fn excerpt(content: &str, max_chars: usize) -> String {
    if content.chars().count() <= max_chars {
        return content.to_string();
    }
    let cut: String = content.chars().take(max_chars).collect();
    format!("{}…", cut.trim_end())
}

#[async_trait]
impl Searcher for ContentStore {
    async fn search(&self, query: &str) -> anyhow::Result<Vec<SearchResult>> {
        Ok(search_content(self, query, 50).await)
    }
}

#[cfg(test)]
pub fn test_store() -> ContentStore {
    ContentStore::seeded(AdminUser::new(
        "root",
        "unset",
        "Root",
        "root@example.com",
        Role::Admin,
    ))
}
