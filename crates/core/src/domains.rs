//! Wellness domains and their AI analysis requirements.
//!
//! A domain is one of a fixed set of categories, each with its own question
//! set, progress tracking, and AI analyzer. Domain names are stored verbatim
//! in the database (note the space in `"quit porn"`).

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const DOMAIN_SKINCARE: &str = "skincare";
pub const DOMAIN_HAIRCARE: &str = "haircare";
pub const DOMAIN_FASHION: &str = "fashion";
pub const DOMAIN_WORKOUT: &str = "workout";
pub const DOMAIN_QUIT_PORN: &str = "quit porn";
pub const DOMAIN_DIET: &str = "diet";
pub const DOMAIN_HEIGHT: &str = "height";
pub const DOMAIN_FACIAL: &str = "facial";

/// Every domain a session may select, in display order.
pub const VALID_DOMAINS: &[&str] = &[
    DOMAIN_SKINCARE,
    DOMAIN_HAIRCARE,
    DOMAIN_FASHION,
    DOMAIN_WORKOUT,
    DOMAIN_QUIT_PORN,
    DOMAIN_DIET,
    DOMAIN_HEIGHT,
    DOMAIN_FACIAL,
];

/// Answers required before analysis runs, for domains without a tuned profile.
pub const DEFAULT_MIN_ANSWERS: usize = 5;

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Returns `true` if `domain` is one of [`VALID_DOMAINS`].
pub fn is_valid_domain(domain: &str) -> bool {
    VALID_DOMAINS.contains(&domain)
}

/// Validate a domain name, producing a 422-class error listing the options.
pub fn validate_domain(domain: &str) -> Result<(), CoreError> {
    if is_valid_domain(domain) {
        Ok(())
    } else {
        Err(CoreError::UnprocessableEntity(format!(
            "Invalid domain. Must be one of: {}",
            VALID_DOMAINS.join(", ")
        )))
    }
}

// ---------------------------------------------------------------------------
// AI profiles
// ---------------------------------------------------------------------------

/// Preconditions for running AI analysis on a completed domain flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainAiProfile {
    pub min_answers: usize,
    pub require_images: bool,
}

impl DomainAiProfile {
    /// Look up the profile for `domain`. Unknown domains get the default.
    pub fn for_domain(domain: &str) -> Self {
        match domain {
            DOMAIN_SKINCARE => Self {
                min_answers: 6,
                require_images: true,
            },
            DOMAIN_HAIRCARE => Self {
                min_answers: 4,
                require_images: false,
            },
            _ => Self {
                min_answers: DEFAULT_MIN_ANSWERS,
                require_images: false,
            },
        }
    }

    /// Whether enough context exists to call the model.
    pub fn can_run_analysis(&self, answer_count: usize, image_count: usize) -> bool {
        answer_count >= self.min_answers && (!self.require_images || image_count > 0)
    }
}

/// Top-level keys the model is expected to return for each domain.
///
/// Missing keys are tolerated downstream; this list only drives warnings.
pub fn required_ai_fields(domain: &str) -> &'static [&'static str] {
    match domain {
        DOMAIN_SKINCARE | DOMAIN_HAIRCARE => &[
            "attributes",
            "health",
            "concerns",
            "routine",
            "remedies",
            "products",
        ],
        DOMAIN_FACIAL => &[
            "attributes",
            "feature_scores",
            "daily_exercises",
            "progress_tracking",
        ],
        DOMAIN_FASHION => &["attributes", "weekly_plan", "seasonal_style"],
        DOMAIN_WORKOUT => &["attributes", "exercises", "progress_tracking"],
        DOMAIN_DIET => &[
            "attributes",
            "nutrition_targets",
            "routine",
            "progress_tracking",
        ],
        DOMAIN_HEIGHT => &[
            "attributes",
            "today_focus",
            "daily_exercises",
            "progress_tracking",
        ],
        DOMAIN_QUIT_PORN => &["attributes", "recovery_path", "progress_tracking"],
        _ => &[],
    }
}

/// Return the required fields that are absent from a model response object.
pub fn missing_ai_fields(domain: &str, data: &serde_json::Value) -> Vec<&'static str> {
    required_ai_fields(domain)
        .iter()
        .copied()
        .filter(|field| data.get(field).is_none())
        .collect()
}
