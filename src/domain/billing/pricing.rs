//! Plan pricing table.
//!
//! Prices are a fixed compile-time table in TRY. Changing a price here is
//! a deploy, not a configuration change.

use super::{BillingCycle, BillingError, Money, PlanType};

/// Returns the price for a plan and billing cycle.
///
/// The table is total over both enums, so an unknown plan can only be
/// rejected earlier, at parse time.
pub fn plan_price(plan: PlanType, cycle: BillingCycle) -> Money {
    let kurus = match (plan, cycle) {
        (PlanType::Personal, BillingCycle::Monthly) => 3_000,
        (PlanType::Personal, BillingCycle::Yearly) => 30_000,
        (PlanType::Professional, BillingCycle::Monthly) => 7_500,
        (PlanType::Professional, BillingCycle::Yearly) => 75_000,
        (PlanType::Enterprise, BillingCycle::Monthly) => 15_000,
        (PlanType::Enterprise, BillingCycle::Yearly) => 150_000,
    };
    Money::from_kurus(kurus).expect("price table holds non-negative constants")
}

/// Looks up a price from raw plan and cycle names.
///
/// Unknown names return `InvalidPlanType` or `InvalidBillingCycle`
/// instead of silently defaulting to any plan.
pub fn plan_price_for(plan: &str, cycle: &str) -> Result<Money, BillingError> {
    let plan: PlanType = plan.parse()?;
    let cycle: BillingCycle = cycle.parse()?;
    Ok(plan_price(plan, cycle))
}
