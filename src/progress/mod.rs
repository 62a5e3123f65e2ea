//! Workflow Progress Deriver — the one place the prerequisite chain lives.
//!
//! `derive_progress` is a pure, total function of the three stored booleans.
//! Gates, the sidebar, and the dashboard all consume its output; nothing
//! else in the crate is allowed to re-implement the chain's boolean logic.

use serde::{Deserialize, Serialize};

use crate::profile::CompletionFlags;

// ─── Stage ────────────────────────────────────────────────────────────────────

/// One tier of the fixed linear prerequisite chain:
/// Profile → Service History → Medical Conditions → Claim Builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Profile,
    ServiceHistory,
    MedicalConditions,
    ClaimBuilder,
}

impl Stage {
    /// Chain order, earliest first.
    pub const ALL: [Stage; 4] = [
        Stage::Profile,
        Stage::ServiceHistory,
        Stage::MedicalConditions,
        Stage::ClaimBuilder,
    ];

    /// Route slug used by the front end and the CLI.
    pub fn route(&self) -> &'static str {
        match self {
            Stage::Profile => "/profile",
            Stage::ServiceHistory => "/service-history",
            Stage::MedicalConditions => "/medical-conditions",
            Stage::ClaimBuilder => "/claim-builder",
        }
    }

    /// Human-readable name for modal text and logs.
    pub fn title(&self) -> &'static str {
        match self {
            Stage::Profile => "Personal Info",
            Stage::ServiceHistory => "Service History",
            Stage::MedicalConditions => "Medical Conditions",
            Stage::ClaimBuilder => "Claim Builder",
        }
    }
}

// ─── WorkflowProgress ─────────────────────────────────────────────────────────

/// Derived view of workflow state. Never persisted; recomputed on demand
/// from the backing flags and discarded after the read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowProgress {
    pub profile_complete: bool,
    pub service_history_complete: bool,
    pub medical_conditions_complete: bool,
    pub can_access_service_history: bool,
    pub can_access_medical_conditions: bool,
    pub can_access_claim_builder: bool,
}

impl WorkflowProgress {
    /// True when the given stage's page may render.
    ///
    /// The Profile page itself is always reachable — it is the chain's entry
    /// point and the redirect target for every blocked gate.
    pub fn stage_unlocked(&self, stage: Stage) -> bool {
        match stage {
            Stage::Profile => true,
            Stage::ServiceHistory => self.can_access_service_history,
            Stage::MedicalConditions => self.can_access_medical_conditions,
            Stage::ClaimBuilder => self.can_access_claim_builder,
        }
    }

    /// Earliest stage whose own completion flag is not yet set, or `None`
    /// when all three stages are complete. This is where a blocked gate
    /// sends the user.
    pub fn first_unmet_stage(&self) -> Option<Stage> {
        if !self.profile_complete {
            Some(Stage::Profile)
        } else if !self.service_history_complete {
            Some(Stage::ServiceHistory)
        } else if !self.medical_conditions_complete {
            Some(Stage::MedicalConditions)
        } else {
            None
        }
    }
}

/// Maps the three stored booleans to the derived lattice.
///
/// Monotone by construction: a later capability is the AND of all earlier
/// flags, so `can_access_claim_builder` implies `can_access_medical_conditions`
/// implies `can_access_service_history` implies `profile_complete`.
pub fn derive_progress(flags: &CompletionFlags) -> WorkflowProgress {
    let p = flags.personal_info_complete;
    let s = flags.service_history_complete;
    let m = flags.medical_conditions_complete;
    WorkflowProgress {
        profile_complete: p,
        service_history_complete: s,
        medical_conditions_complete: m,
        can_access_service_history: p,
        can_access_medical_conditions: p && s,
        can_access_claim_builder: p && s && m,
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn flags(p: bool, s: bool, m: bool) -> CompletionFlags {
        CompletionFlags {
            personal_info_complete: p,
            service_history_complete: s,
            medical_conditions_complete: m,
        }
    }

    #[test]
    fn monotone_over_all_flag_combinations() {
        // Exhaustive over (P, S, M) ∈ {false, true}³.
        for p in [false, true] {
            for s in [false, true] {
                for m in [false, true] {
                    let w = derive_progress(&flags(p, s, m));
                    assert_eq!(w.can_access_service_history, p);
                    assert_eq!(w.can_access_medical_conditions, p && s);
                    assert_eq!(w.can_access_claim_builder, p && s && m);
                    // Chain: each capability implies the one before it.
                    if w.can_access_claim_builder {
                        assert!(w.can_access_medical_conditions);
                    }
                    if w.can_access_medical_conditions {
                        assert!(w.can_access_service_history);
                    }
                    if w.can_access_service_history {
                        assert!(w.profile_complete);
                    }
                }
            }
        }
    }

    #[test]
    fn skipping_a_stage_does_not_unlock_later_ones() {
        // S and M set without P — nothing past the profile unlocks.
        let w = derive_progress(&flags(false, true, true));
        assert!(!w.can_access_service_history);
        assert!(!w.can_access_medical_conditions);
        assert!(!w.can_access_claim_builder);
    }

    #[test]
    fn first_unmet_stage_walks_the_chain() {
        assert_eq!(
            derive_progress(&flags(false, false, false)).first_unmet_stage(),
            Some(Stage::Profile)
        );
        assert_eq!(
            derive_progress(&flags(true, false, false)).first_unmet_stage(),
            Some(Stage::ServiceHistory)
        );
        assert_eq!(
            derive_progress(&flags(true, true, false)).first_unmet_stage(),
            Some(Stage::MedicalConditions)
        );
        assert_eq!(
            derive_progress(&flags(true, true, true)).first_unmet_stage(),
            None
        );
    }

    #[test]
    fn profile_stage_is_always_reachable() {
        let w = derive_progress(&flags(false, false, false));
        assert!(w.stage_unlocked(Stage::Profile));
        assert!(!w.stage_unlocked(Stage::ServiceHistory));
    }
}
