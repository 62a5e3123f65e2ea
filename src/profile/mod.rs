//! Profile domain types: the veteran's identity record, subscription tier,
//! and the three workflow completion flags.
//!
//! Completeness is deliberately minimal — first name, last name, and email.
//! Address, phone, SSN, and VA file number are collected for downstream
//! document generation but do not gate anything.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ─── Subscription & role ──────────────────────────────────────────────────────

/// Paid plan set by the Profile page or by the payment-return side channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    #[default]
    Starter,
    Pro,
    Deluxe,
    Business,
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubscriptionTier::Starter => "starter",
            SubscriptionTier::Pro => "pro",
            SubscriptionTier::Deluxe => "deluxe",
            SubscriptionTier::Business => "business",
        };
        f.write_str(s)
    }
}

impl FromStr for SubscriptionTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "starter" => Ok(SubscriptionTier::Starter),
            "pro" => Ok(SubscriptionTier::Pro),
            "deluxe" => Ok(SubscriptionTier::Deluxe),
            "business" => Ok(SubscriptionTier::Business),
            other => Err(format!("unknown subscription tier: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

// ─── ProfileRecord ────────────────────────────────────────────────────────────

/// Identity and contact data entered on the Profile page.
///
/// Persisted as a single camelCase JSON document under the profile key.
/// `subscription_tier` may also be written by the payment-return handler;
/// that path goes through the same `save` as everything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileRecord {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub ssn: Option<String>,
    pub va_file_number: Option<String>,
    pub subscription_tier: SubscriptionTier,
    pub role: Role,
}

impl ProfileRecord {
    /// Minimal completeness: first name, last name, and email are non-empty.
    /// Whitespace-only values do not count.
    pub fn is_complete(&self) -> bool {
        !self.first_name.trim().is_empty()
            && !self.last_name.trim().is_empty()
            && !self.email.trim().is_empty()
    }
}

// ─── Completion flags ─────────────────────────────────────────────────────────

/// The three persisted workflow booleans.
///
/// Each is set exactly once by its page's successful-save handler and never
/// automatically cleared — "ever completed", not "currently valid".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct CompletionFlags {
    pub personal_info_complete: bool,
    pub service_history_complete: bool,
    pub medical_conditions_complete: bool,
}

/// Names one of the three completion flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FlagName {
    PersonalInfo,
    ServiceHistory,
    MedicalConditions,
}

impl FlagName {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagName::PersonalInfo => "personalInfoComplete",
            FlagName::ServiceHistory => "serviceHistoryComplete",
            FlagName::MedicalConditions => "medicalConditionsComplete",
        }
    }
}

impl fmt::Display for FlagName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlagName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "personalInfoComplete" | "personal-info" => Ok(FlagName::PersonalInfo),
            "serviceHistoryComplete" | "service-history" => Ok(FlagName::ServiceHistory),
            "medicalConditionsComplete" | "medical-conditions" => {
                Ok(FlagName::MedicalConditions)
            }
            other => Err(format!("unknown completion flag: {other}")),
        }
    }
}

impl CompletionFlags {
    pub fn get(&self, name: FlagName) -> bool {
        match name {
            FlagName::PersonalInfo => self.personal_info_complete,
            FlagName::ServiceHistory => self.service_history_complete,
            FlagName::MedicalConditions => self.medical_conditions_complete,
        }
    }

    pub fn set(&mut self, name: FlagName) {
        match name {
            FlagName::PersonalInfo => self.personal_info_complete = true,
            FlagName::ServiceHistory => self.service_history_complete = true,
            FlagName::MedicalConditions => self.medical_conditions_complete = true,
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
