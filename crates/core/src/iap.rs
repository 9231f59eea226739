//! In-app purchase product catalog and store constants.

use serde::{Deserialize, Serialize};

use crate::subscription::PlanType;

/// Apple verifyReceipt status meaning "this is a sandbox receipt, retry there".
pub const APPLE_STATUS_SANDBOX_RECEIPT: i64 = 21007;

/// Apple verifyReceipt status for a valid receipt.
pub const APPLE_STATUS_OK: i64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IapProvider {
    Apple,
    Google,
}

impl IapProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Apple => "apple",
            Self::Google => "google",
        }
    }
}

/// Map a store product id to a plan by keyword. Unknown ids fall back to monthly.
pub fn plan_from_product_id(product_id: &str) -> PlanType {
    let id = product_id.to_lowercase();
    if id.contains("week") {
        PlanType::Weekly
    } else if id.contains("month") {
        PlanType::Monthly
    } else if id.contains("yearly") || id.contains("annual") {
        PlanType::Yearly
    } else {
        PlanType::Monthly
    }
}

/// A purchasable product as listed to the mobile clients.
#[derive(Debug, Clone, Serialize)]
pub struct IapProduct {
    pub id: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub platform: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

const fn product(
    id: &'static str,
    platform: &'static str,
    name: &'static str,
    description: &'static str,
) -> IapProduct {
    IapProduct {
        id,
        kind: "subscription",
        platform,
        name,
        description,
    }
}

/// Store products for both platforms.
pub fn iap_products() -> Vec<IapProduct> {
    vec![
        product("com.lookslab.weekly", "ios", "Weekly Subscription", "Looks Lab Premium - Weekly"),
        product("com.lookslab.monthly", "ios", "Monthly Subscription", "Looks Lab Premium - Monthly"),
        product("com.lookslab.yearly", "ios", "Yearly Subscription", "Looks Lab Premium - Yearly (Save 17%)"),
        product("looks_lab_weekly", "android", "Weekly Subscription", "Looks Lab Premium - Weekly"),
        product("looks_lab_monthly", "android", "Monthly Subscription", "Looks Lab Premium - Monthly"),
        product("looks_lab_yearly", "android", "Yearly Subscription", "Looks Lab Premium - Yearly (Save 17%)"),
    ]
}
