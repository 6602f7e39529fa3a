use crate::models::notification::get_unread_count;
use crate::models::store::ContentStore;

/// Common context data needed by most template renders
pub struct CommonContext {
    pub unread_notification_count: i64,
}

impl CommonContext {
    pub async fn build(store: &ContentStore) -> Self {
        CommonContext {
            unread_notification_count: get_unread_count(store).await,
        }
    }
}
