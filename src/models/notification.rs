use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::store::ContentStore;

#[derive(Clone, Copy, Serialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Like,
    Comment,
    Badge,
    System,
}

#[derive(Clone, Serialize, Debug)]
pub struct Notification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub avatar: Option<String>,
    pub link: String,
    pub read: bool,
    pub action_url: Option<String>,
    pub action_label: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub async fn list_notifications(store: &ContentStore) -> Vec<Notification> {
    let mut notifications = store.notifications.read().await.clone();
    notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    notifications
}

pub async fn get_unread_count(store: &ContentStore) -> i64 {
    store
        .notifications
        .read()
        .await
        .iter()
        .filter(|n| !n.read)
        .count() as i64
}

pub async fn mark_notification_read(store: &ContentStore, id: Uuid) -> Result<Notification> {
    let mut notifications = store.notifications.write().await;
    let notification = notifications
        .iter_mut()
        .find(|n| n.id == id)
        .ok_or_else(|| anyhow::anyhow!("notification not found"))?;

    notification.read = true;

    Ok(notification.clone())
}

pub async fn mark_all_notifications_read(store: &ContentStore) -> i64 {
    let mut notifications = store.notifications.write().await;
    let mut marked = 0;
    for notification in notifications.iter_mut().filter(|n| !n.read) {
        notification.read = true;
        marked += 1;
    }
    marked
}

pub async fn dismiss_notification(store: &ContentStore, id: Uuid) -> Result<()> {
    let mut notifications = store.notifications.write().await;
    let before = notifications.len();
    notifications.retain(|n| n.id != id);

    if notifications.len() == before {
        return Err(anyhow::anyhow!("notification not found"));
    }
    Ok(())
}
