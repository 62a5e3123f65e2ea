//! Feature Gate — the guard run at the top of every workflow-dependent page.
//!
//! On mount the gate loads the profile record and, for later tiers, the
//! derived progress, and either allows the render or blocks it with a modal
//! whose single productive action navigates to the unmet prerequisite's
//! page. Dismissing the modal is not a bypass: the caller navigates to the
//! same redirect either way.
//!
//! [`GateWatch`] keeps a mounted page's gate live against the bus: every
//! workflow event triggers a re-derivation, so a page blocked at mount
//! unlocks in place when the prerequisite completes elsewhere — no manual
//! refresh. Within a session a gate never moves back from Unlocked to
//! Locked; completion flags are never cleared short of an account reset.

use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

use crate::bus::{EventBus, Subscription};
use crate::progress::{derive_progress, Stage};
use crate::store::ProfileStore;

// ─── Pages ────────────────────────────────────────────────────────────────────

/// Every page that runs a gate at mount.
///
/// The AI feature pages (lay statement, buddy statement, coaching) gate at
/// the profile tier: a complete profile is enough, no completion flags
/// required.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum GatedPage {
    ServiceHistory,
    MedicalConditions,
    ClaimBuilder,
    LayStatement,
    BuddyStatement,
    Coaching,
}

impl GatedPage {
    pub fn title(&self) -> &'static str {
        match self {
            GatedPage::ServiceHistory => "Service History",
            GatedPage::MedicalConditions => "Medical Conditions",
            GatedPage::ClaimBuilder => "Claim Builder",
            GatedPage::LayStatement => "Lay Statement",
            GatedPage::BuddyStatement => "Buddy Statement",
            GatedPage::Coaching => "Claim Coaching",
        }
    }

    /// Derived-progress tier this page additionally requires, beyond the
    /// profile-record check every gated page performs. `None` means the
    /// profile check alone decides (Service History and the AI pages).
    fn tier_requirement(&self) -> Option<Stage> {
        match self {
            GatedPage::ServiceHistory
            | GatedPage::LayStatement
            | GatedPage::BuddyStatement
            | GatedPage::Coaching => None,
            GatedPage::MedicalConditions => Some(Stage::MedicalConditions),
            GatedPage::ClaimBuilder => Some(Stage::ClaimBuilder),
        }
    }
}

// ─── Outcome ──────────────────────────────────────────────────────────────────

/// Modal content shown when a gate blocks. The action route is the only
/// productive way out; closing the modal sends the user there anyway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockingPrompt {
    pub title: String,
    pub message: String,
    pub action_label: String,
    pub action_route: String,
}

/// Result of evaluating a gate at page mount.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Allow,
    Blocked {
        /// Unmet prerequisite's stage; the forced-navigation target.
        redirect: Stage,
        prompt: BlockingPrompt,
    },
}

impl GateOutcome {
    pub fn is_allowed(&self) -> bool {
        matches!(self, GateOutcome::Allow)
    }

    /// Route the caller must navigate to when the user dismisses the modal
    /// without taking its action. `None` when the gate allowed the render.
    pub fn dismiss_route(&self) -> Option<&str> {
        match self {
            GateOutcome::Allow => None,
            GateOutcome::Blocked { redirect, .. } => Some(redirect.route()),
        }
    }
}

// ─── FeatureGate ──────────────────────────────────────────────────────────────

/// Stateless gate evaluator. All chain logic is delegated to the deriver;
/// the gate only maps its output (plus the profile-record check) to an
/// outcome.
#[derive(Clone)]
pub struct FeatureGate {
    store: ProfileStore,
}

impl FeatureGate {
    pub fn new(store: ProfileStore) -> Self {
        Self { store }
    }

    /// Runs the two-step check from the page's perspective at mount time.
    /// Absent or malformed stored state fails closed — the page blocks.
    pub fn evaluate(&self, page: GatedPage) -> GateOutcome {
        // Step 1: every gated page requires a complete profile record.
        let profile_ok = self
            .store
            .load()
            .map(|record| record.is_complete())
            .unwrap_or(false);
        if !profile_ok {
            debug!(page = ?page, "gate blocked: profile incomplete");
            return Self::blocked(page, Stage::Profile);
        }

        // Step 2: later tiers also require derived capabilities.
        if let Some(tier) = page.tier_requirement() {
            let progress = derive_progress(&self.store.flags());
            if !progress.stage_unlocked(tier) {
                let redirect = progress.first_unmet_stage().unwrap_or(Stage::Profile);
                debug!(page = ?page, redirect = ?redirect, "gate blocked: prerequisite unmet");
                return Self::blocked(page, redirect);
            }
        }

        GateOutcome::Allow
    }

    fn blocked(page: GatedPage, redirect: Stage) -> GateOutcome {
        let message = match redirect {
            Stage::Profile => format!(
                "Personal Info is required before you can use {}. \
                 Complete your profile to continue.",
                page.title()
            ),
            _ => format!(
                "Complete {} before you can use {}.",
                redirect.title(),
                page.title()
            ),
        };
        GateOutcome::Blocked {
            redirect,
            prompt: BlockingPrompt {
                title: format!("{} required", redirect.title()),
                message,
                action_label: format!("Go to {}", redirect.title()),
                action_route: redirect.route().to_string(),
            },
        }
    }
}

// ─── GateWatch ────────────────────────────────────────────────────────────────

/// Session gating status for one mounted page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Locked,
    Unlocked,
}

/// A mounted page's live gate: evaluated once at mount, then re-evaluated on
/// every workflow event. The subscriber only upgrades the state — once a
/// tier unlocks for the session it stays unlocked.
pub struct GateWatch {
    page: GatedPage,
    state: Arc<Mutex<GateState>>,
    subscription: Option<Subscription>,
}

impl GateWatch {
    /// Evaluates the gate and subscribes to the workflow topic. The caller
    /// must call [`GateWatch::unmount`] when the page unmounts.
    pub fn mount(page: GatedPage, store: ProfileStore, bus: &EventBus) -> Self {
        let gate = FeatureGate::new(store);
        let initial = match gate.evaluate(page) {
            GateOutcome::Allow => GateState::Unlocked,
            GateOutcome::Blocked { .. } => GateState::Locked,
        };
        let state = Arc::new(Mutex::new(initial));

        let watched_state = Arc::clone(&state);
        let subscription = bus.subscribe_workflow(move || {
            let mut current = watched_state.lock().expect("gate state mutex poisoned");
            if *current == GateState::Unlocked {
                return;
            }
            if gate.evaluate(page).is_allowed() {
                info!(page = ?page, "gate unlocked by workflow change");
                *current = GateState::Unlocked;
            }
        });

        Self {
            page,
            state,
            subscription: Some(subscription),
        }
    }

    pub fn page(&self) -> GatedPage {
        self.page
    }

    pub fn state(&self) -> GateState {
        *self.state.lock().expect("gate state mutex poisoned")
    }

    /// Removes the bus subscription. Required on unmount; a watch that is
    /// dropped without unmounting keeps its handler registered.
    pub fn unmount(mut self) {
        if let Some(sub) = self.subscription.take() {
            sub.unsubscribe();
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
