// Locally persisted favorites set.
//
// Persistence is a pluggable capability so the store can be backed by a JSON
// file in production and by memory in tests. The serialized form is a single
// JSON array of vehicle ids, rewritten in full on every mutation, mirroring
// how a browser profile would keep one localStorage key.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};

use crate::models::VehicleRecord;

/// Durable storage adapter for the favorites set.
pub trait FavoritesBackend: Send + Sync {
    /// Loads the persisted id list. An absent store reads as empty.
    fn load(&self) -> Result<Vec<String>>;
    /// Overwrites the store with the full serialized set.
    fn persist(&self, ids: &[String]) -> Result<()>;
}

/// JSON file on disk, one array of ids.
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileBackend { path: path.into() }
    }
}

impl FavoritesBackend for FileBackend {
    fn load(&self) -> Result<Vec<String>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read favorites file {:?}", self.path))?;
        let ids = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse favorites file {:?}", self.path))?;
        Ok(ids)
    }

    fn persist(&self, ids: &[String]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create favorites dir {:?}", parent))?;
            }
        }
        let raw = serde_json::to_string(ids).context("Failed to serialize favorites")?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write favorites file {:?}", self.path))?;
        Ok(())
    }
}

/// In-memory backend standing in for durable storage in tests.
#[derive(Default)]
pub struct MemoryBackend {
    stored: Mutex<Option<String>>,
}

impl FavoritesBackend for MemoryBackend {
    fn load(&self) -> Result<Vec<String>> {
        let guard = self.stored.lock().expect("favorites memory backend poisoned");
        match guard.as_deref() {
            Some(raw) => Ok(serde_json::from_str(raw)?),
            None => Ok(Vec::new()),
        }
    }

    fn persist(&self, ids: &[String]) -> Result<()> {
        let raw = serde_json::to_string(ids)?;
        *self.stored.lock().expect("favorites memory backend poisoned") = Some(raw);
        Ok(())
    }
}

/// The set of vehicle ids the user has starred. Loaded from the backend once
/// at construction; every toggle writes the full set straight back.
pub struct FavoritesStore {
    set: HashSet<String>,
    backend: Box<dyn FavoritesBackend>,
}

impl FavoritesStore {
    pub fn load(backend: Box<dyn FavoritesBackend>) -> Result<Self> {
        let set = backend.load()?.into_iter().collect();
        Ok(FavoritesStore { set, backend })
    }

    /// Idempotent toggle: present becomes absent and vice versa. Returns the
    /// new membership after persisting it.
    pub fn toggle(&mut self, id: &str) -> Result<bool> {
        let now_favorite = if self.set.contains(id) {
            self.set.remove(id);
            false
        } else {
            self.set.insert(id.to_string());
            true
        };
        let mut ids: Vec<String> = self.set.iter().cloned().collect();
        ids.sort();
        self.backend.persist(&ids)?;
        Ok(now_favorite)
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.set.contains(id)
    }

    pub fn len(&self) -> usize {
        self.set.len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.is_empty()
    }

    /// Current membership as a value, for the pure filter evaluator.
    pub fn ids(&self) -> HashSet<String> {
        self.set.clone()
    }

    /// Restricts a record list to favorited vehicles.
    pub fn retain_favorites(&self, records: &[VehicleRecord]) -> Vec<VehicleRecord> {
        records
            .iter()
            .filter(|car| self.set.contains(&car.id))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    // Shared handle so a "reload" can reuse the same stored bytes.
    struct SharedBackend(Arc<MemoryBackend>);

    impl FavoritesBackend for SharedBackend {
        fn load(&self) -> Result<Vec<String>> {
            self.0.load()
        }
        fn persist(&self, ids: &[String]) -> Result<()> {
            self.0.persist(ids)
        }
    }

    #[test]
    fn double_toggle_restores_original_membership() {
        let mut store = FavoritesStore::load(Box::new(MemoryBackend::default())).unwrap();
        assert!(!store.is_favorite("x"));

        assert!(store.toggle("x").unwrap());
        assert!(store.is_favorite("x"));

        assert!(!store.toggle("x").unwrap());
        assert!(!store.is_favorite("x"));
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn membership_survives_a_reload_from_the_backend() {
        let shared = Arc::new(MemoryBackend::default());

        let mut store = FavoritesStore::load(Box::new(SharedBackend(shared.clone()))).unwrap();
        store.toggle("a").unwrap();
        store.toggle("b").unwrap();
        store.toggle("a").unwrap();
        drop(store);

        let reloaded = FavoritesStore::load(Box::new(SharedBackend(shared))).unwrap();
        assert!(!reloaded.is_favorite("a"));
        assert!(reloaded.is_favorite("b"));
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn file_backend_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("favorites.json");

        let mut store = FavoritesStore::load(Box::new(FileBackend::new(&path))).unwrap();
        store.toggle("abc123").unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        let ids: Vec<String> = serde_json::from_str(&raw).unwrap();
        assert_eq!(ids, vec!["abc123".to_string()]);

        let reloaded = FavoritesStore::load(Box::new(FileBackend::new(&path))).unwrap();
        assert!(reloaded.is_favorite("abc123"));
    }

    #[test]
    fn missing_file_reads_as_empty_set() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        let store = FavoritesStore::load(Box::new(FileBackend::new(path))).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn retain_favorites_filters_records_by_membership() {
        let mut store = FavoritesStore::load(Box::new(MemoryBackend::default())).unwrap();
        store.toggle("a").unwrap();

        let records = vec![
            VehicleRecord {
                id: "a".to_string(),
                ..VehicleRecord::default()
            },
            VehicleRecord {
                id: "b".to_string(),
                ..VehicleRecord::default()
            },
        ];
        let kept = store.retain_favorites(&records);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, "a");
    }
}
