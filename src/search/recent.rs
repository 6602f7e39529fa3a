use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;

/// Storage key the recent-search list lives under.
pub const STORAGE_KEY: &str = "recent_searches";

/// The list keeps at most this many entries; the oldest is evicted.
pub const MAX_RECENT: usize = 5;

/// Key-value persistence seam, so tests can substitute an in-memory store for
/// the on-disk one.
pub trait RecentStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RecentStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Persists keys as a JSON object in a single file.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_all(&self) -> Result<HashMap<String, String>> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(HashMap::new()),
            Err(err) => Err(err.into()),
        }
    }
}

impl RecentStore for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut all = self.read_all().unwrap_or_default();
        all.insert(key.to_string(), value.to_string());
        std::fs::write(&self.path, serde_json::to_string_pretty(&all)?)?;
        Ok(())
    }
}

/// Bounded, de-duplicated, most-recent-first query history.
pub struct RecentSearches {
    store: Arc<dyn RecentStore>,
    entries: Vec<String>,
}

impl RecentSearches {
    /// Read the persisted list once. A missing or corrupt value starts empty;
    /// the history is an affordance, not critical state.
    pub fn load(store: Arc<dyn RecentStore>) -> Self {
        let mut entries: Vec<String> = store
            .get(STORAGE_KEY)
            .ok()
            .flatten()
            .and_then(|raw| serde_json::from_str(&raw).ok())
            .unwrap_or_default();
        entries.truncate(MAX_RECENT);

        Self { store, entries }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Front-insert a submitted query, de-duplicating and capping the list,
    /// then persist it.
    pub fn record(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            return;
        }

        self.entries.retain(|entry| entry != query);
        self.entries.insert(0, query.to_string());
        self.entries.truncate(MAX_RECENT);

        let raw = serde_json::to_string(&self.entries).unwrap_or_else(|_| "[]".to_string());
        if let Err(err) = self.store.set(STORAGE_KEY, &raw) {
            tracing::warn!("failed to persist recent searches: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory() -> Arc<MemoryStore> {
        Arc::new(MemoryStore::new())
    }

    #[test]
    fn record_front_inserts_and_dedupes() {
        let mut recents = RecentSearches::load(memory());
        recents.record("nextjs");
        recents.record("rust");
        recents.record("nextjs");

        assert_eq!(recents.entries(), ["nextjs", "rust"]);
    }

    #[test]
    fn list_is_capped_at_five() {
        let mut recents = RecentSearches::load(memory());
        for query in ["one", "two", "three", "four", "five", "six"] {
            recents.record(query);
        }

        assert_eq!(recents.entries().len(), MAX_RECENT);
        assert_eq!(recents.entries()[0], "six");
        assert!(!recents.entries().contains(&"one".to_string()));
    }

    #[test]
    fn whitespace_submissions_are_ignored() {
        let mut recents = RecentSearches::load(memory());
        recents.record("   ");
        assert!(recents.entries().is_empty());

        recents.record("  padded  ");
        assert_eq!(recents.entries(), ["padded"]);
    }

    #[test]
    fn list_round_trips_through_the_store() {
        let store = memory();
        {
            let mut recents = RecentSearches::load(store.clone());
            recents.record("cats");
            recents.record("dogs");
        }

        let reloaded = RecentSearches::load(store);
        assert_eq!(reloaded.entries(), ["dogs", "cats"]);
    }

    #[test]
    fn corrupt_storage_starts_empty() {
        let store = memory();
        store.set(STORAGE_KEY, "not json").unwrap();

        let recents = RecentSearches::load(store);
        assert!(recents.entries().is_empty());
    }

    #[test]
    fn json_file_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recent.json");

        let store = JsonFileStore::new(&path);
        assert_eq!(store.get(STORAGE_KEY).unwrap(), None);

        store.set(STORAGE_KEY, r#"["cats"]"#).unwrap();
        assert_eq!(
            store.get(STORAGE_KEY).unwrap().as_deref(),
            Some(r#"["cats"]"#)
        );
    }
}
