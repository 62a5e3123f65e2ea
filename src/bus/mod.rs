//! Change Notification Bus — synchronous fan-out signals between mounted
//! surfaces (sidebar, dashboard cards, feature pages).
//!
//! Two topics exist and stay distinct at the API level: `workflow` fires on
//! any completion-flag or profile mutation, `notifications` fires when the
//! user-facing notification list changes. Events carry no payload —
//! observers re-read current state on receipt. An observer that mounts after
//! a publish sees nothing retroactively; it must read state on mount.
//!
//! Delivery is synchronous and in subscription order, over a snapshot of the
//! subscriber list taken at publish time: a handler may unsubscribe itself
//! or others mid-publish without corrupting the in-flight iteration, and a
//! panicking handler is isolated so the rest still run.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use tracing::warn;

type Handler = Arc<dyn Fn() + Send + Sync>;

// ─── Subscription ─────────────────────────────────────────────────────────────

/// Capability to remove a registered handler.
///
/// Unsubscribing on unmount is the subscriber's obligation — there is no
/// drop-based cleanup. A handle dropped without `unsubscribe()` leaves its
/// handler registered for the bus's lifetime.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub fn unsubscribe(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

// ─── Signal channel ───────────────────────────────────────────────────────────

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    handlers: Vec<(u64, Handler)>,
}

/// One topic's subscriber list. Both topics run on this same mechanism but
/// are exposed as separate methods on [`EventBus`] so they cannot be mixed
/// up at a call site.
#[derive(Clone, Default)]
struct SignalChannel {
    subscribers: Arc<Mutex<Subscribers>>,
}

impl SignalChannel {
    fn subscribe(&self, handler: impl Fn() + Send + Sync + 'static) -> Subscription {
        let id = {
            let mut subs = self.subscribers.lock().expect("bus mutex poisoned");
            let id = subs.next_id;
            subs.next_id += 1;
            subs.handlers.push((id, Arc::new(handler)));
            id
        };
        let subscribers = Arc::clone(&self.subscribers);
        Subscription {
            cancel: Some(Box::new(move || {
                subscribers
                    .lock()
                    .expect("bus mutex poisoned")
                    .handlers
                    .retain(|(hid, _)| *hid != id);
            })),
        }
    }

    fn publish(&self, topic: &'static str) {
        // Snapshot under the lock, invoke outside it. Every handler present
        // at publish time runs exactly once, even if one of them mutates the
        // subscriber list mid-delivery.
        let snapshot: Vec<Handler> = self
            .subscribers
            .lock()
            .expect("bus mutex poisoned")
            .handlers
            .iter()
            .map(|(_, h)| Arc::clone(h))
            .collect();

        for handler in snapshot {
            if catch_unwind(AssertUnwindSafe(|| handler())).is_err() {
                warn!(topic, "bus handler panicked — continuing with remaining handlers");
            }
        }
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.subscribers.lock().expect("bus mutex poisoned").handlers.len()
    }
}

// ─── EventBus ─────────────────────────────────────────────────────────────────

/// Process-wide bus shared by every mounted surface.
#[derive(Clone, Default)]
pub struct EventBus {
    workflow: SignalChannel,
    notifications: SignalChannel,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fires whenever a completion flag or the profile record changes.
    pub fn subscribe_workflow(
        &self,
        handler: impl Fn() + Send + Sync + 'static,
    ) -> Subscription {
        self.workflow.subscribe(handler)
    }

    pub fn publish_workflow_changed(&self) {
        self.workflow.publish("workflow");
    }

    /// Fires whenever the user-facing notification list changes. Unrelated
    /// to workflow gating; kept on its own topic.
    pub fn subscribe_notifications(
        &self,
        handler: impl Fn() + Send + Sync + 'static,
    ) -> Subscription {
        self.notifications.subscribe(handler)
    }

    pub fn publish_notifications_changed(&self) {
        self.notifications.publish("notifications");
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
