use std::path::PathBuf;
use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DurationSeconds};

use crate::locale::Locale;

#[serde_as]
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AppConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    #[serde(default = "default_env")]
    pub env: String,
    #[serde(default)]
    pub default_locale: Locale,
    pub admin_login_name: String,
    /// Argon2 hash of the admin password. Generate one with `cli hash-password`.
    pub admin_password_hash: String,
    #[serde(default = "default_recent_searches_path")]
    pub recent_searches_path: PathBuf,
    #[serde_as(as = "DurationSeconds<u64>")]
    #[serde(default = "default_download_tick")]
    pub download_tick: Duration,
}

fn default_listen_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_env() -> String {
    "development".to_string()
}

fn default_recent_searches_path() -> PathBuf {
    PathBuf::from("recent_searches.json")
}

fn default_download_tick() -> Duration {
    Duration::from_secs(1)
}

impl AppConfig {
    pub fn new_from_file_and_env(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("lingora"))
            .build()
            .and_then(|cfg| cfg.try_deserialize::<Self>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let cfg: AppConfig = serde_json::from_str(
            r#"{"admin_login_name": "admin", "admin_password_hash": "$argon2id$stub"}"#,
        )
        .unwrap();

        assert_eq!(cfg.listen_addr, "0.0.0.0:3000");
        assert_eq!(cfg.default_locale, Locale::En);
        assert_eq!(cfg.download_tick, Duration::from_secs(1));
    }
}
