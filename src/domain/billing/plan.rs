//! Plan and billing cycle definitions.
//!
//! Represents the subscription plans sold for Ravenkart digital cards.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::domain::foundation::Timestamp;

use super::BillingError;

/// Subscription plan tier.
///
/// Determines card features and pricing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    /// Single card, standard themes.
    Personal,

    /// Multiple cards, analytics, custom branding.
    Professional,

    /// Team management, SSO, priority support.
    Enterprise,
}

impl PlanType {
    /// All plans, in ascending price order.
    pub const ALL: [PlanType; 3] = [
        PlanType::Personal,
        PlanType::Professional,
        PlanType::Enterprise,
    ];

    /// Returns the canonical lowercase name used in APIs and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanType::Personal => "personal",
            PlanType::Professional => "professional",
            PlanType::Enterprise => "enterprise",
        }
    }

    /// Returns the display name for this plan.
    pub fn display_name(&self) -> &'static str {
        match self {
            PlanType::Personal => "Personal",
            PlanType::Professional => "Professional",
            PlanType::Enterprise => "Enterprise",
        }
    }
}

impl std::fmt::Display for PlanType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PlanType {
    type Err = BillingError;

    /// Parses a plan name. Unknown names are rejected, never defaulted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "personal" => Ok(PlanType::Personal),
            "professional" => Ok(PlanType::Professional),
            "enterprise" => Ok(PlanType::Enterprise),
            other => Err(BillingError::invalid_plan_type(other)),
        }
    }
}

/// Billing cycle for a subscription plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BillingCycle {
    Monthly,
    Yearly,
}

impl BillingCycle {
    /// All cycles.
    pub const ALL: [BillingCycle; 2] = [BillingCycle::Monthly, BillingCycle::Yearly];

    /// Returns the canonical lowercase name used in APIs and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            BillingCycle::Monthly => "monthly",
            BillingCycle::Yearly => "yearly",
        }
    }

    /// Computes when a period starting at `starts_at` ends.
    ///
    /// Monthly adds one calendar month, yearly one calendar year, with
    /// day-of-month clamping (Jan 31 monthly ends Feb 28). Returns None
    /// only if the date would leave the representable range.
    pub fn period_end(&self, starts_at: Timestamp) -> Option<Timestamp> {
        match self {
            BillingCycle::Monthly => starts_at.add_months(1),
            BillingCycle::Yearly => starts_at.add_years(1),
        }
    }
}

impl std::fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BillingCycle {
    type Err = BillingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "monthly" => Ok(BillingCycle::Monthly),
            "yearly" => Ok(BillingCycle::Yearly),
            other => Err(BillingError::invalid_billing_cycle(other)),
        }
    }
}
