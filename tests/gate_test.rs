//! End-to-end tests for the gating workflow.
//!
//! Tests cover:
//! 1. Fresh session — gated page blocks with a Personal Info modal
//! 2. Complete profile + flag — Service History renders, no modal
//! 3. Partial chain — Medical Conditions redirects to Service History
//! 4. Two mounted surfaces update on one publish, no reload
//! 5. Modal dismissal still forces navigation
//! 6. Full chain unlock, stage by stage
//! 7. Account reset clears profile, flags, and notifications

use std::sync::{Arc, Mutex};

use claimflow::gate::{FeatureGate, GateOutcome, GateState, GateWatch, GatedPage};
use claimflow::profile::{FlagName, ProfileRecord};
use claimflow::progress::Stage;
use claimflow::AppContext;

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn complete_profile() -> ProfileRecord {
    ProfileRecord {
        first_name: "Jane".into(),
        last_name: "Doe".into(),
        email: "j@x.com".into(),
        ..Default::default()
    }
}

// ─── Fresh session blocks toward the Profile page ───────────────────────────

#[test]
fn fresh_session_blocks_service_history_with_personal_info_modal() {
    let ctx = AppContext::in_memory();
    let gate = FeatureGate::new(ctx.store.clone());

    match gate.evaluate(GatedPage::ServiceHistory) {
        GateOutcome::Blocked { redirect, prompt } => {
            assert_eq!(redirect, Stage::Profile);
            assert!(prompt.message.contains("Personal Info"));
            assert_eq!(prompt.action_route, "/profile");
        }
        GateOutcome::Allow => panic!("fresh session must not render Service History"),
    }
}

// ─── Complete profile renders without a modal ───────────────────────────────

#[test]
fn complete_profile_with_flag_renders_service_history() {
    let ctx = AppContext::in_memory();
    ctx.store.save(&complete_profile());
    ctx.store.set_flag(FlagName::PersonalInfo);

    let gate = FeatureGate::new(ctx.store.clone());
    assert_eq!(gate.evaluate(GatedPage::ServiceHistory), GateOutcome::Allow);
}

// ─── Redirect targets the correct unmet prerequisite ────────────────────────

#[test]
fn medical_conditions_redirects_to_service_history_when_p_true_s_false() {
    let ctx = AppContext::in_memory();
    ctx.store.save(&complete_profile());
    ctx.store.set_flag(FlagName::PersonalInfo);

    let gate = FeatureGate::new(ctx.store.clone());
    match gate.evaluate(GatedPage::MedicalConditions) {
        GateOutcome::Blocked { redirect, .. } => {
            assert_eq!(redirect, Stage::ServiceHistory, "not the Profile page");
        }
        GateOutcome::Allow => panic!("expected block"),
    }
}

// ─── One publish updates every mounted surface ──────────────────────────────

#[test]
fn sidebar_and_dashboard_update_on_one_publish_without_reload() {
    let ctx = AppContext::in_memory();

    // Two independent surfaces watching the same tier.
    let sidebar = GateWatch::mount(GatedPage::ServiceHistory, ctx.store.clone(), &ctx.bus);
    let dashboard = GateWatch::mount(GatedPage::ServiceHistory, ctx.store.clone(), &ctx.bus);
    assert_eq!(sidebar.state(), GateState::Locked);
    assert_eq!(dashboard.state(), GateState::Locked);

    // Profile page saves and announces — both update, no reload.
    ctx.store.save(&complete_profile());
    ctx.store.set_flag(FlagName::PersonalInfo);
    ctx.bus.publish_workflow_changed();

    assert_eq!(sidebar.state(), GateState::Unlocked);
    assert_eq!(dashboard.state(), GateState::Unlocked);
    sidebar.unmount();
    dashboard.unmount();
}

// ─── Dismissing the modal still forces navigation ───────────────────────────

#[test]
fn modal_dismissal_navigates_to_the_redirect_anyway() {
    let ctx = AppContext::in_memory();
    let gate = FeatureGate::new(ctx.store.clone());

    let outcome = gate.evaluate(GatedPage::ClaimBuilder);
    // Closing the modal is not a bypass: the dismiss route equals the
    // modal action's route.
    assert_eq!(outcome.dismiss_route(), Some("/profile"));
}

// ─── The chain unlocks in order as flags are set ────────────────────────────

#[test]
fn chain_unlocks_in_order_as_flags_are_set() {
    let ctx = AppContext::in_memory();
    let gate = FeatureGate::new(ctx.store.clone());
    ctx.store.save(&complete_profile());

    ctx.store.set_flag(FlagName::PersonalInfo);
    assert!(gate.evaluate(GatedPage::ServiceHistory).is_allowed());
    assert!(!gate.evaluate(GatedPage::MedicalConditions).is_allowed());

    ctx.store.set_flag(FlagName::ServiceHistory);
    assert!(gate.evaluate(GatedPage::MedicalConditions).is_allowed());
    assert!(!gate.evaluate(GatedPage::ClaimBuilder).is_allowed());

    ctx.store.set_flag(FlagName::MedicalConditions);
    assert!(gate.evaluate(GatedPage::ClaimBuilder).is_allowed());
}

// ─── Re-derivation is driven by publishes, not by store writes ───────────────

#[test]
fn mounted_watch_does_not_update_until_the_publish() {
    let ctx = AppContext::in_memory();
    let watch = GateWatch::mount(GatedPage::ServiceHistory, ctx.store.clone(), &ctx.bus);

    ctx.store.save(&complete_profile());
    ctx.store.set_flag(FlagName::PersonalInfo);
    // Store mutated but nothing announced yet.
    assert_eq!(watch.state(), GateState::Locked);

    ctx.bus.publish_workflow_changed();
    assert_eq!(watch.state(), GateState::Unlocked);
    watch.unmount();
}

// ─── Workflow and notification topics stay independent end to end ────────────

#[test]
fn notification_traffic_does_not_touch_gate_watches() {
    let ctx = AppContext::in_memory();
    let watch = GateWatch::mount(GatedPage::ServiceHistory, ctx.store.clone(), &ctx.bus);

    let workflow_hits = Arc::new(Mutex::new(0));
    let h = Arc::clone(&workflow_hits);
    let sub = ctx.bus.subscribe_workflow(move || *h.lock().unwrap() += 1);

    // Notification center mutations publish only their own topic.
    ctx.notifications.push(
        claimflow::notifications::NotificationKind::Info,
        "Welcome",
        "Start with your profile",
        Some("/profile".into()),
    );

    assert_eq!(*workflow_hits.lock().unwrap(), 0);
    assert_eq!(watch.state(), GateState::Locked);
    sub.unsubscribe();
    watch.unmount();
}

// ─── Account reset clears everything and announces it ────────────────────────

#[test]
fn reset_clears_profile_flags_and_notifications() {
    let ctx = AppContext::in_memory();
    ctx.store.save(&complete_profile());
    ctx.store.set_flag(FlagName::PersonalInfo);
    ctx.notifications.push(
        claimflow::notifications::NotificationKind::Info,
        "Welcome",
        "Start with your profile",
        None,
    );

    let workflow_hits = Arc::new(Mutex::new(0));
    let notif_hits = Arc::new(Mutex::new(0));
    let w = Arc::clone(&workflow_hits);
    let w_sub = ctx.bus.subscribe_workflow(move || *w.lock().unwrap() += 1);
    let n = Arc::clone(&notif_hits);
    let n_sub = ctx.bus.subscribe_notifications(move || *n.lock().unwrap() += 1);

    ctx.reset();

    // All client-persisted state is gone — record, flags, and the
    // notification list alike.
    assert_eq!(ctx.store.load(), None);
    assert!(!ctx.store.flags().personal_info_complete);
    assert!(ctx.notifications.list().is_empty());
    assert_eq!(ctx.notifications.unread_count(), 0);

    // Both topics were announced so mounted surfaces re-derive.
    assert_eq!(*workflow_hits.lock().unwrap(), 1);
    assert_eq!(*notif_hits.lock().unwrap(), 1);

    w_sub.unsubscribe();
    n_sub.unsubscribe();
}
