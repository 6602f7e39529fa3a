use std::sync::Arc;

use minijinja::Environment;

use crate::models::store::ContentStore;
use crate::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub env: Environment<'static>,
    pub content: Arc<ContentStore>,
}

#[cfg(test)]
impl AppState {
    pub(crate) fn for_tests() -> Self {
        use crate::locale::Locale;
        use crate::models::user::{AdminUser, Role};

        let config = AppConfig {
            listen_addr: "127.0.0.1:0".to_string(),
            env: "test".to_string(),
            default_locale: Locale::En,
            admin_login_name: "root".to_string(),
            admin_password_hash: "unset".to_string(),
            recent_searches_path: "recent_searches.json".into(),
            download_tick: std::time::Duration::from_secs(1),
        };

        AppState {
            config,
            env: Environment::new(),
            content: Arc::new(ContentStore::seeded(AdminUser::new(
                "root",
                "unset",
                "Root",
                "root@example.com",
                Role::Admin,
            ))),
        }
    }
}
