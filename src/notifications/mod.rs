//! User-facing notification list — alert messages shown in the header bell.
//!
//! Unrelated to workflow gating; it shares the bus mechanism but publishes
//! on its own topic. Persisted as an id-keyed map through the same key-value
//! backend as the profile store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::bus::EventBus;
use crate::store::backend::KeyValueBackend;

const NOTIFICATIONS_KEY: &str = "notifications";

// ─── Types ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Success,
    Warning,
    Payment,
}

/// One alert message. `link` is an optional in-app route the notification
/// navigates to when clicked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub link: Option<String>,
}

// ─── NotificationCenter ───────────────────────────────────────────────────────

/// Reads and mutates the persisted notification map, publishing the
/// notifications topic after every mutation so mounted surfaces (the bell
/// badge, the dropdown list) re-read without a reload.
#[derive(Clone)]
pub struct NotificationCenter {
    kv: Arc<dyn KeyValueBackend>,
    bus: EventBus,
}

impl NotificationCenter {
    pub fn new(kv: Arc<dyn KeyValueBackend>, bus: EventBus) -> Self {
        Self { kv, bus }
    }

    /// Adds a notification and returns its generated id.
    pub fn push(
        &self,
        kind: NotificationKind,
        title: &str,
        message: &str,
        link: Option<String>,
    ) -> String {
        let id = Uuid::new_v4().to_string();
        let mut map = self.read_map();
        map.insert(
            id.clone(),
            Notification {
                id: id.clone(),
                kind,
                title: title.to_string(),
                message: message.to_string(),
                read: false,
                created_at: Utc::now(),
                link,
            },
        );
        self.write_map(&map);
        self.bus.publish_notifications_changed();
        id
    }

    /// All notifications, newest first.
    pub fn list(&self) -> Vec<Notification> {
        let mut all: Vec<Notification> = self.read_map().into_values().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        all
    }

    pub fn unread_count(&self) -> usize {
        self.read_map().values().filter(|n| !n.read).count()
    }

    /// Marks one notification read. Unknown ids are a no-op.
    pub fn mark_read(&self, id: &str) {
        let mut map = self.read_map();
        match map.get_mut(id) {
            Some(n) if !n.read => {
                n.read = true;
                self.write_map(&map);
                self.bus.publish_notifications_changed();
            }
            _ => {}
        }
    }

    pub fn mark_all_read(&self) {
        let mut map = self.read_map();
        let mut changed = false;
        for n in map.values_mut() {
            if !n.read {
                n.read = true;
                changed = true;
            }
        }
        if changed {
            self.write_map(&map);
            self.bus.publish_notifications_changed();
        }
    }

    /// Removes every notification (account reset). Publishes the topic so
    /// mounted badges drop to zero without a reload.
    pub fn clear(&self) {
        self.kv.remove(NOTIFICATIONS_KEY);
        self.bus.publish_notifications_changed();
    }

    // Malformed stored state reads as empty — same fail-closed posture as
    // the profile store.
    fn read_map(&self) -> BTreeMap<String, Notification> {
        match self.kv.get(NOTIFICATIONS_KEY) {
            None => BTreeMap::new(),
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("stored notifications are malformed — starting empty: {e}");
                BTreeMap::new()
            }),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, Notification>) {
        match serde_json::to_string(map) {
            Ok(json) => self.kv.set(NOTIFICATIONS_KEY, &json),
            Err(e) => warn!("failed to serialize notifications: {e}"),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
