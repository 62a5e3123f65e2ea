//! Synchronous string key-value surface the store persists through.
//!
//! The engine treats its durable medium as `get/set/remove` over strings and
//! nothing more, so tests can swap in `MemoryBackend` and the CLI runs on
//! `FileBackend` in the data directory.

use anyhow::{Context as _, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

// ─── Trait ────────────────────────────────────────────────────────────────────

/// Durable string key-value storage. All operations are synchronous and
/// effectively atomic from a single process's perspective; last writer wins.
pub trait KeyValueBackend: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

// ─── MemoryBackend ────────────────────────────────────────────────────────────

/// In-process backend for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().expect("kv mutex poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .expect("kv mutex poisoned")
            .insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.lock().expect("kv mutex poisoned").remove(key);
    }
}

// ─── FileBackend ──────────────────────────────────────────────────────────────

/// Backend persisted as one JSON object file in the data directory.
///
/// Writes go through a temp file in the same directory followed by a rename,
/// so a crash mid-write leaves the previous file intact. A file that fails
/// to parse at open is treated as empty (fail closed) — the engine never
/// grants access based on state it cannot read.
pub struct FileBackend {
    path: PathBuf,
    entries: Mutex<HashMap<String, String>>,
}

impl FileBackend {
    /// Opens (or creates) the store file at `<data_dir>/store.json`.
    pub fn open(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("failed to create data dir {}", data_dir.display()))?;
        let path = data_dir.join("store.json");

        let entries = match std::fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<HashMap<String, String>>(&raw) {
                Ok(map) => map,
                Err(e) => {
                    warn!(path = %path.display(), "store file is corrupt — starting empty: {e}");
                    HashMap::new()
                }
            },
            Err(_) => HashMap::new(),
        };

        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    /// Serialize the current map and atomically replace the store file.
    /// I/O failures are logged, not surfaced — the in-memory view stays
    /// authoritative for the rest of the session.
    fn flush(&self, entries: &HashMap<String, String>) {
        let json = match serde_json::to_string_pretty(entries) {
            Ok(s) => s,
            Err(e) => {
                warn!("failed to serialize store: {e}");
                return;
            }
        };
        let tmp = self.path.with_extension("json.tmp");
        if let Err(e) = std::fs::write(&tmp, json).and_then(|_| std::fs::rename(&tmp, &self.path))
        {
            warn!(path = %self.path.display(), "failed to persist store: {e}");
        }
    }
}

impl KeyValueBackend for FileBackend {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().expect("kv mutex poisoned").get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().expect("kv mutex poisoned");
        entries.insert(key.to_string(), value.to_string());
        self.flush(&entries);
    }

    fn remove(&self, key: &str) {
        let mut entries = self.entries.lock().expect("kv mutex poisoned");
        entries.remove(key);
        self.flush(&entries);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
