pub mod bus;
pub mod config;
pub mod gate;
pub mod notifications;
pub mod profile;
pub mod progress;
pub mod store;
pub mod sync;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use bus::EventBus;
use config::AppConfig;
use notifications::NotificationCenter;
use store::backend::{FileBackend, KeyValueBackend, MemoryBackend};
use store::ProfileStore;

/// Shared engine state handed to every page, gate, and CLI subcommand.
///
/// One store, one bus: every surface that mutates completion state does it
/// through `store` and announces it on `bus`, so every other mounted
/// surface re-derives from the same source of truth.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<AppConfig>,
    pub store: ProfileStore,
    pub bus: EventBus,
    pub notifications: NotificationCenter,
}

impl AppContext {
    /// Production wiring: file-backed store in the config's data directory.
    pub fn open(config: AppConfig) -> Result<Self> {
        let kv: Arc<dyn KeyValueBackend> = Arc::new(FileBackend::open(&config.data_dir)?);
        Ok(Self::with_backend(config, kv))
    }

    /// In-memory wiring for tests and ephemeral sessions.
    pub fn in_memory() -> Self {
        Self::with_backend(AppConfig::default(), Arc::new(MemoryBackend::new()))
    }

    fn with_backend(config: AppConfig, kv: Arc<dyn KeyValueBackend>) -> Self {
        let bus = EventBus::new();
        Self {
            config: Arc::new(config),
            store: ProfileStore::new(Arc::clone(&kv)),
            bus: bus.clone(),
            notifications: NotificationCenter::new(kv, bus),
        }
    }

    /// Full account deletion: clears the profile record, completion flags,
    /// and notifications, then announces both topics so every mounted
    /// surface re-derives against the now-empty state.
    pub fn reset(&self) {
        self.store.clear();
        self.notifications.clear();
        self.bus.publish_workflow_changed();
    }

    /// Path of the config file inside a data directory.
    pub fn config_path(data_dir: &Path) -> PathBuf {
        data_dir.join("config.toml")
    }
}
