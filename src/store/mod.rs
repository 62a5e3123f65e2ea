//! Profile Completion Store — durable record of what the user has entered
//! and which workflow stages they have ever completed.
//!
//! All reads are synchronous; a stored value that fails to parse is treated
//! as absent and logged, never surfaced as an error. Gating must fail
//! closed: a corrupt record is an incomplete record.

pub mod backend;

use std::sync::Arc;
use tracing::{debug, warn};

use crate::profile::{CompletionFlags, FlagName, ProfileRecord, SubscriptionTier};
use backend::KeyValueBackend;

/// Key for the serialized `ProfileRecord`.
const PROFILE_KEY: &str = "profile";
/// Key for the serialized `CompletionFlags`.
const FLAGS_KEY: &str = "completionFlags";

/// Narrow store interface handed to pages and gates. Holds the backend
/// behind `Arc` so the CLI, gates, and the sync overlay share one instance.
#[derive(Clone)]
pub struct ProfileStore {
    kv: Arc<dyn KeyValueBackend>,
}

impl ProfileStore {
    pub fn new(kv: Arc<dyn KeyValueBackend>) -> Self {
        Self { kv }
    }

    /// Returns the last saved record, or `None` if nothing has ever been
    /// saved. A value that fails to deserialize is treated as absent.
    pub fn load(&self) -> Option<ProfileRecord> {
        let raw = self.kv.get(PROFILE_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("stored profile is malformed — treating as absent: {e}");
                None
            }
        }
    }

    /// Overwrites the full record. Field-level merging is the caller's job
    /// before calling this; the store is last-writer-wins.
    pub fn save(&self, record: &ProfileRecord) {
        match serde_json::to_string(record) {
            Ok(json) => self.kv.set(PROFILE_KEY, &json),
            Err(e) => warn!("failed to serialize profile record: {e}"),
        }
    }

    /// Current completion flags; absent or malformed state defaults to
    /// all-false.
    pub fn flags(&self) -> CompletionFlags {
        match self.kv.get(FLAGS_KEY) {
            None => CompletionFlags::default(),
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("stored completion flags are malformed — defaulting to false: {e}");
                CompletionFlags::default()
            }),
        }
    }

    /// Marks a completion flag true. Idempotent; flags are never cleared by
    /// this path ("ever completed").
    pub fn set_flag(&self, name: FlagName) {
        let mut flags = self.flags();
        if flags.get(name) {
            debug!(flag = %name, "completion flag already set");
            return;
        }
        flags.set(name);
        match serde_json::to_string(&flags) {
            Ok(json) => self.kv.set(FLAGS_KEY, &json),
            Err(e) => warn!("failed to serialize completion flags: {e}"),
        }
        debug!(flag = %name, "completion flag set");
    }

    /// Payment-return side channel: updates the tier on the stored record
    /// (creating a default record if none exists) through the uniform
    /// `save` path.
    pub fn set_subscription_tier(&self, tier: SubscriptionTier) {
        let mut record = self.load().unwrap_or_default();
        record.subscription_tier = tier;
        self.save(&record);
        debug!(tier = %tier, "subscription tier updated");
    }

    /// Clears the record and all completion flags — the store's share of an
    /// account reset. `AppContext::reset` also clears notifications.
    pub fn clear(&self) {
        self.kv.remove(PROFILE_KEY);
        self.kv.remove(FLAGS_KEY);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
