//! Durable trendline storage.
//!
//! Trendlines are kept as a single JSON array under one key of a
//! [`StorageBackend`]:
//!
//! ```json
//! [{"id":"1700000000000","start":{"timestamp":1700000000,"price":43000.0},
//!   "end":{"timestamp":1700003000,"price":43500.0},"color":"#2962FF"}]
//! ```
//!
//! Pixel hints are never stored. Loading is forgiving: a missing or corrupt
//! entry yields an empty list, and individual malformed trendlines are dropped.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

use crate::drawing::{Trendline, TrendlineId, TrendlinePoint, DEFAULT_TRENDLINE_COLOR};

/// Key of the stored trendline array.
pub const DEFAULT_STORAGE_KEY: &str = "tradingTrendlines";

#[derive(Error, Debug)]
pub enum PersistError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error("failed to encode trendlines: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Keyed string storage, the shape of browser local storage.
pub trait StorageBackend {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError>;
    fn set(&self, key: &str, value: &str) -> Result<(), PersistError>;
    fn remove(&self, key: &str) -> Result<(), PersistError>;
}

/// One file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl StorageBackend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        match fs::read_to_string(self.path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path(key);
        // Write then rename so a crash never leaves a half-written entry.
        let tmp = self.dir.join(format!("{key}.json.tmp"));
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    entries: HashMap<String, String>,
    writes: usize,
}

/// In-process storage. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set`/`remove` calls so far.
    pub fn writes(&self) -> usize {
        self.lock().writes
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.lock().entries.get(key).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl StorageBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<String>, PersistError> {
        Ok(self.lock().entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), PersistError> {
        let mut state = self.lock();
        state.entries.insert(key.to_string(), value.to_string());
        state.writes += 1;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), PersistError> {
        let mut state = self.lock();
        state.entries.remove(key);
        state.writes += 1;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredPoint {
    timestamp: i64,
    // null when a non-finite price was written
    price: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredTrendline {
    id: String,
    start: StoredPoint,
    end: StoredPoint,
    #[serde(default)]
    color: Option<String>,
}

impl From<&Trendline> for StoredTrendline {
    fn from(line: &Trendline) -> Self {
        let point = |p: &TrendlinePoint| StoredPoint {
            timestamp: p.timestamp,
            price: Some(p.price),
        };
        Self {
            id: line.id.to_string(),
            start: point(&line.start),
            end: point(&line.end),
            color: Some(line.color.clone()),
        }
    }
}

impl StoredTrendline {
    fn into_trendline(self) -> Option<Trendline> {
        let point = |p: StoredPoint| match p.price {
            Some(price) if price.is_finite() => Some(TrendlinePoint::unplaced(p.timestamp, price)),
            _ => None,
        };
        let start = point(self.start)?;
        let end = point(self.end)?;
        let color = self.color.unwrap_or_else(|| DEFAULT_TRENDLINE_COLOR.to_string());
        Some(Trendline::with_id(self.id, start, end, color))
    }
}

/// Saves and restores the trendline collection through a storage backend.
pub struct PersistenceBridge {
    backend: Box<dyn StorageBackend>,
    key: String,
}

impl PersistenceBridge {
    pub fn new(backend: impl StorageBackend + 'static, key: impl Into<String>) -> Self {
        Self {
            backend: Box::new(backend),
            key: key.into(),
        }
    }

    /// Bridge over a fresh in-memory backend under the default key.
    pub fn in_memory() -> Self {
        Self::new(MemoryBackend::new(), DEFAULT_STORAGE_KEY)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Replace the stored array with `trendlines`.
    pub fn save(&self, trendlines: &[Trendline]) -> Result<(), PersistError> {
        let stored: Vec<StoredTrendline> = trendlines.iter().map(StoredTrendline::from).collect();
        let json = serde_json::to_string(&stored)?;
        self.backend.set(&self.key, &json)
    }

    /// Restore stored trendlines with zeroed pixel hints.
    ///
    /// Never fails: absent or unreadable data yields an empty list.
    pub fn load(&self) -> Vec<Trendline> {
        let raw = match self.backend.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                log::warn!("could not read stored trendlines: {e}");
                return Vec::new();
            }
        };

        let entries: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("stored trendlines are corrupt, starting empty: {e}");
                return Vec::new();
            }
        };

        let total = entries.len();
        let trendlines: Vec<Trendline> = entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value::<StoredTrendline>(entry).ok())
            .filter_map(StoredTrendline::into_trendline)
            .collect();

        if trendlines.len() != total {
            log::warn!("dropped {} malformed stored trendlines", total - trendlines.len());
        }
        for line in &trendlines {
            TrendlineId::reserve(&line.id);
        }
        trendlines
    }

    /// Remove the stored entry entirely.
    pub fn clear(&self) -> Result<(), PersistError> {
        self.backend.remove(&self.key)
    }
}

impl std::fmt::Debug for PersistenceBridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceBridge").field("key", &self.key).finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, start: (i64, f64), end: (i64, f64), color: &str) -> Trendline {
        Trendline::with_id(
            id,
            TrendlinePoint {
                timestamp: start.0,
                price: start.1,
                pixel_x: 12.0,
                pixel_y: 34.0,
            },
            TrendlinePoint {
                timestamp: end.0,
                price: end.1,
                pixel_x: 56.0,
                pixel_y: 78.0,
            },
            color,
        )
    }

    #[test]
    fn test_save_then_load_resets_pixel_hints() {
        let bridge = PersistenceBridge::in_memory();
        let saved = vec![
            line("1", (1000, 100.0), (2000, 120.0), "#2962FF"),
            line("2", (1500, 99.5), (1500, 99.5), "#FF0000"),
        ];
        bridge.save(&saved).unwrap();

        let loaded = bridge.load();
        assert_eq!(loaded.len(), 2);
        for (a, b) in saved.iter().zip(&loaded) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.color, b.color);
            assert_eq!(a.start.domain(), b.start.domain());
            assert_eq!(a.end.domain(), b.end.domain());
            assert_eq!(b.start.pixel_x, 0.0);
            assert_eq!(b.end.pixel_y, 0.0);
        }
    }

    #[test]
    fn test_stored_format_has_no_pixel_hints() {
        let backend = MemoryBackend::new();
        let bridge = PersistenceBridge::new(backend.clone(), DEFAULT_STORAGE_KEY);
        bridge.save(&[line("7", (1, 2.0), (3, 4.0), "#2962FF")]).unwrap();

        let raw = backend.raw(DEFAULT_STORAGE_KEY).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(
            value,
            serde_json::json!([{
                "id": "7",
                "start": {"timestamp": 1, "price": 2.0},
                "end": {"timestamp": 3, "price": 4.0},
                "color": "#2962FF"
            }])
        );
    }

    #[test]
    fn test_load_missing_is_empty() {
        assert!(PersistenceBridge::in_memory().load().is_empty());
    }

    #[test]
    fn test_load_corrupt_is_empty() {
        let backend = MemoryBackend::new();
        backend.set(DEFAULT_STORAGE_KEY, "{not json").unwrap();
        let bridge = PersistenceBridge::new(backend, DEFAULT_STORAGE_KEY);
        assert!(bridge.load().is_empty());
    }

    #[test]
    fn test_load_defaults_color_and_drops_bad_entries() {
        let backend = MemoryBackend::new();
        backend
            .set(
                DEFAULT_STORAGE_KEY,
                r#"[
                    {"id":"1","start":{"timestamp":10,"price":1.5},"end":{"timestamp":20,"price":2.5}},
                    {"id":"2","start":{"timestamp":10,"price":null},"end":{"timestamp":20,"price":2.5}},
                    {"id":"3","start":{"timestamp":10}},
                    "garbage"
                ]"#,
            )
            .unwrap();
        let loaded = PersistenceBridge::new(backend, DEFAULT_STORAGE_KEY).load();

        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id.as_str(), "1");
        assert_eq!(loaded[0].color, DEFAULT_TRENDLINE_COLOR);
    }

    #[test]
    fn test_clear_removes_entry() {
        let backend = MemoryBackend::new();
        let bridge = PersistenceBridge::new(backend.clone(), DEFAULT_STORAGE_KEY);
        bridge.save(&[line("1", (1, 1.0), (2, 2.0), "#2962FF")]).unwrap();
        bridge.clear().unwrap();
        assert!(backend.raw(DEFAULT_STORAGE_KEY).is_none());
        assert_eq!(backend.writes(), 2);
    }

    #[test]
    fn test_file_backend_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path().join("store"));

        assert_eq!(backend.get("k").unwrap(), None);
        backend.set("k", "[1,2]").unwrap();
        assert_eq!(backend.get("k").unwrap().as_deref(), Some("[1,2]"));
        assert!(dir.path().join("store").join("k.json").exists());

        backend.remove("k").unwrap();
        assert_eq!(backend.get("k").unwrap(), None);
        // Removing twice is fine
        backend.remove("k").unwrap();
    }

    #[test]
    fn test_file_backend_keeps_dotted_keys_apart() {
        let dir = tempfile::tempdir().unwrap();
        let backend = FileBackend::new(dir.path());

        backend.set("trendlines.v2", "[2]").unwrap();
        backend.set("trendlines", "[1]").unwrap();
        assert!(dir.path().join("trendlines.v2.json").exists());
        assert!(!dir.path().join("trendlines.v2.json.tmp").exists());
        assert_eq!(backend.get("trendlines.v2").unwrap().as_deref(), Some("[2]"));
        assert_eq!(backend.get("trendlines").unwrap().as_deref(), Some("[1]"));

        backend.remove("trendlines").unwrap();
        assert_eq!(backend.get("trendlines.v2").unwrap().as_deref(), Some("[2]"));
    }

    #[test]
    fn test_file_bridge_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let saved = vec![line("1", (1000, 100.0), (2000, 120.0), "#2962FF")];
        PersistenceBridge::new(FileBackend::new(dir.path()), DEFAULT_STORAGE_KEY)
            .save(&saved)
            .unwrap();

        let loaded = PersistenceBridge::new(FileBackend::new(dir.path()), DEFAULT_STORAGE_KEY).load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].end.price, 120.0);
    }
}
