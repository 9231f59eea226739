//! Subscription plans, statuses, and pricing helpers.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

// ---------------------------------------------------------------------------
// Plan type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanType {
    Weekly,
    Monthly,
    Yearly,
}

impl PlanType {
    pub const ALL: [PlanType; 3] = [Self::Weekly, Self::Monthly, Self::Yearly];

    /// Parse a plan string from the database.
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            _ => Err(CoreError::Validation(format!(
                "Invalid plan '{s}'. Must be one of: weekly, monthly, yearly"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    pub fn duration_days(&self) -> i64 {
        match self {
            Self::Weekly => 7,
            Self::Monthly => 30,
            Self::Yearly => 365,
        }
    }

    /// List price in USD.
    pub fn price(&self) -> f64 {
        match self {
            Self::Weekly => 4.99,
            Self::Monthly => 9.99,
            Self::Yearly => 29.99,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Self::Weekly => 1,
            Self::Monthly => 2,
            Self::Yearly => 3,
        }
    }
}

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Pending,
    Active,
    Expired,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn from_str_db(s: &str) -> Result<Self, CoreError> {
        match s {
            "pending" => Ok(Self::Pending),
            "active" => Ok(Self::Active),
            "expired" => Ok(Self::Expired),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(CoreError::Validation(format!(
                "Invalid subscription status '{s}'. Must be one of: pending, active, expired, cancelled"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        }
    }
}

/// The status a client should see: a lapsed `end_date` reads as expired
/// regardless of the stored status.
pub fn effective_status(
    stored: &str,
    end_date: Option<Timestamp>,
    now: Timestamp,
) -> Result<SubscriptionStatus, CoreError> {
    if end_date.is_some_and(|end| end < now) {
        return Ok(SubscriptionStatus::Expired);
    }
    SubscriptionStatus::from_str_db(stored)
}

// ---------------------------------------------------------------------------
// Plan helpers
// ---------------------------------------------------------------------------

pub fn calculate_end_date(start: Timestamp, plan: PlanType) -> Timestamp {
    start + Duration::days(plan.duration_days())
}

/// Savings against buying the weekly plan for the same number of days.
/// `None` for the weekly plan itself.
pub fn savings_percent(plan: PlanType) -> Option<i64> {
    if plan == PlanType::Weekly {
        return None;
    }
    let weekly_equivalent = PlanType::Weekly.price() / 7.0 * plan.duration_days() as f64;
    let savings = (weekly_equivalent - plan.price()) / weekly_equivalent * 100.0;
    Some(savings.round() as i64)
}

pub fn plan_features(plan: PlanType) -> Vec<&'static str> {
    let mut features = vec![
        "AI-Powered Analysis",
        "Expert Transformations",
        "Priority Post",
        "Unlimited Consultations",
    ];
    match plan {
        PlanType::Weekly => {}
        PlanType::Monthly => features.push("Weekly Progress Reports"),
        PlanType::Yearly => features.extend([
            "Weekly Progress Reports",
            "Best Value - Save 75%",
            "Priority Support",
        ]),
    }
    features
}

/// True when moving from `current` to `new` is a step up in plan tier.
pub fn is_upgrade(current: PlanType, new: PlanType) -> bool {
    new.rank() > current.rank()
}
