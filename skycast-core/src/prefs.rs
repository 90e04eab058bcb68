//! User preference state: temperature unit, recent searches, favorites.
//!
//! In-memory state is authoritative for the running session. Durable storage
//! is a best-effort mirror: read once at load, written after every mutation.
//! A write failure never reaches the caller, and a corrupt stored value falls
//! back to the default for that key alone.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use tracing::warn;

use crate::units::TemperatureUnit;

/// Recent searches kept, most-recent-first.
pub const MAX_RECENT_SEARCHES: usize = 5;

const KEY_UNIT: &str = "temp_unit";
const KEY_RECENT: &str = "recent_searches";
const KEY_FAVORITES: &str = "favorite_locations";

/// One remembered search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentSearch {
    pub name: String,
    pub timestamp_ms: i64,
}

/// One starred location. Names are free text; two cities sharing a display
/// name are indistinguishable here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub name: String,
}

/// String key-value storage the preferences are mirrored into.
pub trait Storage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// One JSON file per key under the platform data directory.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Storage rooted at the platform data directory.
    pub fn open_default() -> Result<Self> {
        let dirs = ProjectDirs::from("dev", "skycast", "skycast")
            .ok_or_else(|| anyhow!("Could not determine platform data directory"))?;

        Ok(Self { dir: dirs.data_dir().to_path_buf() })
    }

    /// Storage rooted at an explicit directory.
    pub fn at(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Failed to create data directory: {}", self.dir.display()))?;

        let path = self.path_for(key);
        fs::write(&path, value)
            .with_context(|| format!("Failed to write preference file: {}", path.display()))
    }
}

/// Recency reordering: drop any entry with the same name, prepend, truncate.
fn with_search(list: &[RecentSearch], name: &str, timestamp_ms: i64) -> Vec<RecentSearch> {
    let mut next = Vec::with_capacity(MAX_RECENT_SEARCHES);
    next.push(RecentSearch { name: name.to_string(), timestamp_ms });
    next.extend(list.iter().filter(|s| s.name != name).cloned());
    next.truncate(MAX_RECENT_SEARCHES);
    next
}

fn with_favorite(list: &[Favorite], name: &str) -> Vec<Favorite> {
    if list.iter().any(|f| f.name == name) {
        return list.to_vec();
    }
    let mut next = list.to_vec();
    next.push(Favorite { name: name.to_string() });
    next
}

fn without_favorite(list: &[Favorite], name: &str) -> Vec<Favorite> {
    list.iter().filter(|f| f.name != name).cloned().collect()
}

fn read_key<T: DeserializeOwned>(storage: &impl Storage, key: &str) -> Option<T> {
    let raw = storage.get(key)?;
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(key, %err, "stored preference is corrupt, using default");
            None
        }
    }
}

fn persist<S: Storage, T: Serialize>(storage: &mut S, key: &str, value: &T) {
    let json = match serde_json::to_string(value) {
        Ok(json) => json,
        Err(err) => {
            warn!(key, %err, "could not serialize preference");
            return;
        }
    };

    if let Err(err) = storage.set(key, &json) {
        warn!(key, %err, "could not persist preference");
    }
}

/// Process-wide preference state. All mutation goes through the named
/// operations below, each of which mirrors the new value into storage.
#[derive(Debug)]
pub struct Preferences<S: Storage> {
    unit: TemperatureUnit,
    recent: Vec<RecentSearch>,
    favorites: Vec<Favorite>,
    storage: S,
}

impl<S: Storage> Preferences<S> {
    /// Read the three keys independently; any missing or unparsable value
    /// falls back to its default without affecting the others.
    pub fn load(storage: S) -> Self {
        let unit = read_key(&storage, KEY_UNIT).unwrap_or_default();
        let recent = read_key(&storage, KEY_RECENT).unwrap_or_default();
        let favorites = read_key(&storage, KEY_FAVORITES).unwrap_or_default();

        Self { unit, recent, favorites, storage }
    }

    pub fn unit(&self) -> TemperatureUnit {
        self.unit
    }

    /// Most recent first.
    pub fn recent_searches(&self) -> &[RecentSearch] {
        &self.recent
    }

    /// Insertion order.
    pub fn favorites(&self) -> &[Favorite] {
        &self.favorites
    }

    pub fn toggle_unit(&mut self) {
        self.unit = self.unit.toggled();
        persist(&mut self.storage, KEY_UNIT, &self.unit);
    }

    /// Remember a search under the current wall clock. Searching the same
    /// name again moves it to the front rather than duplicating it.
    pub fn record_search(&mut self, name: &str) {
        self.record_search_at(name, Utc::now().timestamp_millis());
    }

    fn record_search_at(&mut self, name: &str, timestamp_ms: i64) {
        self.recent = with_search(&self.recent, name, timestamp_ms);
        persist(&mut self.storage, KEY_RECENT, &self.recent);
    }

    /// No-op when the name is already starred.
    pub fn add_favorite(&mut self, name: &str) {
        self.favorites = with_favorite(&self.favorites, name);
        persist(&mut self.storage, KEY_FAVORITES, &self.favorites);
    }

    /// Exact-match removal; no-op when absent.
    pub fn remove_favorite(&mut self, name: &str) {
        self.favorites = without_favorite(&self.favorites, name);
        persist(&mut self.storage, KEY_FAVORITES, &self.favorites);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    /// Shared in-memory storage so a test can reload from the same backing map.
    #[derive(Debug, Clone, Default)]
    struct MemoryStorage(Arc<Mutex<HashMap<String, String>>>);

    impl MemoryStorage {
        fn insert(&self, key: &str, value: &str) {
            self.0.lock().unwrap().insert(key.to_string(), value.to_string());
        }
    }

    impl Storage for MemoryStorage {
        fn get(&self, key: &str) -> Option<String> {
            self.0.lock().unwrap().get(key).cloned()
        }

        fn set(&mut self, key: &str, value: &str) -> Result<()> {
            self.insert(key, value);
            Ok(())
        }
    }

    struct FailingStorage;

    impl Storage for FailingStorage {
        fn get(&self, _key: &str) -> Option<String> {
            None
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(anyhow!("disk full"))
        }
    }

    #[test]
    fn defaults_when_storage_is_empty() {
        let prefs = Preferences::load(MemoryStorage::default());

        assert_eq!(prefs.unit(), TemperatureUnit::Celsius);
        assert!(prefs.recent_searches().is_empty());
        assert!(prefs.favorites().is_empty());
    }

    #[test]
    fn double_toggle_restores_unit() {
        let mut prefs = Preferences::load(MemoryStorage::default());

        prefs.toggle_unit();
        assert_eq!(prefs.unit(), TemperatureUnit::Fahrenheit);
        prefs.toggle_unit();
        assert_eq!(prefs.unit(), TemperatureUnit::Celsius);
    }

    #[test]
    fn repeated_search_moves_to_front_with_later_timestamp() {
        let mut prefs = Preferences::load(MemoryStorage::default());

        prefs.record_search_at("Paris", 1_000);
        prefs.record_search_at("Paris", 2_000);

        assert_eq!(prefs.recent_searches().len(), 1);
        assert_eq!(prefs.recent_searches()[0].name, "Paris");
        assert_eq!(prefs.recent_searches()[0].timestamp_ms, 2_000);
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut prefs = Preferences::load(MemoryStorage::default());

        for (i, name) in ["Oslo", "Lima", "Cairo", "Quito", "Dakar", "Hanoi"].iter().enumerate() {
            prefs.record_search_at(name, i as i64);
        }

        let names: Vec<_> = prefs.recent_searches().iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Hanoi", "Dakar", "Quito", "Cairo", "Lima"]);
    }

    #[test]
    fn search_is_case_sensitive() {
        let mut prefs = Preferences::load(MemoryStorage::default());

        prefs.record_search_at("paris", 1);
        prefs.record_search_at("Paris", 2);

        assert_eq!(prefs.recent_searches().len(), 2);
    }

    #[test]
    fn add_favorite_is_idempotent() {
        let mut prefs = Preferences::load(MemoryStorage::default());

        prefs.add_favorite("Tokyo");
        prefs.add_favorite("Tokyo");

        assert_eq!(prefs.favorites().len(), 1);
        assert_eq!(prefs.favorites()[0].name, "Tokyo");
    }

    #[test]
    fn remove_favorite_and_nonmember_noop() {
        let mut prefs = Preferences::load(MemoryStorage::default());

        prefs.add_favorite("Tokyo");
        prefs.remove_favorite("Tokyo");
        assert!(prefs.favorites().is_empty());

        prefs.remove_favorite("Tokyo");
        assert!(prefs.favorites().is_empty());
    }

    #[test]
    fn favorites_preserve_insertion_order() {
        let mut prefs = Preferences::load(MemoryStorage::default());

        prefs.add_favorite("Tokyo");
        prefs.add_favorite("Lagos");
        prefs.add_favorite("Bern");
        prefs.remove_favorite("Lagos");

        let names: Vec<_> = prefs.favorites().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Tokyo", "Bern"]);
    }

    #[test]
    fn mutations_survive_reload() {
        let storage = MemoryStorage::default();

        {
            let mut prefs = Preferences::load(storage.clone());
            prefs.toggle_unit();
            prefs.record_search_at("Paris", 42);
            prefs.add_favorite("Tokyo");
        }

        let prefs = Preferences::load(storage);
        assert_eq!(prefs.unit(), TemperatureUnit::Fahrenheit);
        assert_eq!(prefs.recent_searches()[0].name, "Paris");
        assert_eq!(prefs.favorites()[0].name, "Tokyo");
    }

    #[test]
    fn corrupt_key_does_not_affect_others() {
        let storage = MemoryStorage::default();
        storage.insert(KEY_UNIT, "\"fahrenheit\"");
        storage.insert(KEY_RECENT, "[{\"name\":\"Paris\",\"timestamp_ms\":7}]");
        storage.insert(KEY_FAVORITES, "{not json");

        let prefs = Preferences::load(storage);

        assert_eq!(prefs.unit(), TemperatureUnit::Fahrenheit);
        assert_eq!(prefs.recent_searches().len(), 1);
        assert!(prefs.favorites().is_empty());
    }

    #[test]
    fn write_failure_keeps_in_memory_state() {
        let mut prefs = Preferences::load(FailingStorage);

        prefs.toggle_unit();
        prefs.record_search_at("Paris", 1);
        prefs.add_favorite("Tokyo");

        assert_eq!(prefs.unit(), TemperatureUnit::Fahrenheit);
        assert_eq!(prefs.recent_searches().len(), 1);
        assert_eq!(prefs.favorites().len(), 1);
    }

    #[test]
    fn file_storage_round_trips() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut storage = FileStorage::at(dir.path().join("prefs"));

        assert_eq!(storage.get(KEY_UNIT), None);
        storage.set(KEY_UNIT, "\"celsius\"").expect("write");
        assert_eq!(storage.get(KEY_UNIT).as_deref(), Some("\"celsius\""));
    }
}
