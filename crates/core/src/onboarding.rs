//! Onboarding flow constants, answer validation, and redirect rules.
//!
//! An onboarding session walks five fixed steps in [`ONBOARDING_ORDER`].
//! Sessions start anonymous and are linked to an account after sign-in; the
//! redirect returned on completion tells the client what is still missing.

use serde::Serialize;
use serde_json::Value;

use crate::domains::is_valid_domain;
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

pub const STEP_PROFILE_SETUP: &str = "profile_setup";
pub const STEP_DAILY_LIFESTYLE: &str = "daily_lifestyle";
pub const STEP_MOTIVATION: &str = "motivation";
pub const STEP_GOALS_FOCUS: &str = "goals_focus";
pub const STEP_EXPERIENCE_PLANNING: &str = "experience_planning";

/// Step label reported once every step is answered.
pub const STEP_COMPLETED: &str = "completed";

/// The order in which onboarding steps are presented.
pub const ONBOARDING_ORDER: &[&str] = &[
    STEP_PROFILE_SETUP,
    STEP_DAILY_LIFESTYLE,
    STEP_MOTIVATION,
    STEP_GOALS_FOCUS,
    STEP_EXPERIENCE_PLANNING,
];

/// Steps whose answers feed the home-screen wellness overview.
pub const WELLNESS_STEPS: &[&str] = &[STEP_PROFILE_SETUP, STEP_DAILY_LIFESTYLE];

/// Return the step after `current`, or `None` for the last or an unknown step.
pub fn next_step(current: &str) -> Option<&'static str> {
    let idx = ONBOARDING_ORDER.iter().position(|s| *s == current)?;
    ONBOARDING_ORDER.get(idx + 1).copied()
}

/// Validate that `step` names an onboarding step.
pub fn validate_step(step: &str) -> Result<(), CoreError> {
    if ONBOARDING_ORDER.contains(&step) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid step '{step}'. Must be one of: {}",
            ONBOARDING_ORDER.join(", ")
        )))
    }
}

// ---------------------------------------------------------------------------
// Answer validation
// ---------------------------------------------------------------------------

/// Validate an answer against its question type, options, and constraints.
///
/// The question type is matched case-insensitively after trimming. Unknown
/// or absent types accept any non-empty answer.
pub fn validate_answer(
    answer: &Value,
    question_type: Option<&str>,
    options: &[String],
    constraints: Option<&Value>,
) -> Result<(), CoreError> {
    let is_blank = match answer {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    };
    if is_blank {
        return Err(CoreError::Validation("Answer cannot be empty".into()));
    }

    let q_type = question_type.unwrap_or_default().trim().to_lowercase();

    match q_type.as_str() {
        "number" | "numeric" => {
            let value = answer
                .as_f64()
                .ok_or_else(|| CoreError::Validation("Answer must be a number".into()))?;

            if let Some(min) = constraint_number(constraints, "min") {
                if value < min.as_f64().unwrap_or(f64::MIN) {
                    return Err(CoreError::Validation(format!("Value must be >= {min}")));
                }
            }
            if let Some(max) = constraint_number(constraints, "max") {
                if value > max.as_f64().unwrap_or(f64::MAX) {
                    return Err(CoreError::Validation(format!("Value must be <= {max}")));
                }
            }
        }
        "choice" | "single-choice" => {
            let matches = answer
                .as_str()
                .is_some_and(|a| options.iter().any(|o| o == a));
            if !matches {
                return Err(CoreError::Validation(format!(
                    "Answer must be one of {options:?}"
                )));
            }
        }
        "multi-choice" => {
            let items = answer
                .as_array()
                .ok_or_else(|| CoreError::Validation("Answer must be a list".into()))?;
            let invalid: Vec<&Value> = items
                .iter()
                .filter(|item| !item.as_str().is_some_and(|a| options.iter().any(|o| o == a)))
                .collect();
            if !invalid.is_empty() {
                let invalid = Value::Array(invalid.into_iter().cloned().collect());
                return Err(CoreError::Validation(format!(
                    "Invalid options: {invalid}. Must be from {options:?}"
                )));
            }
        }
        "text" => {
            if !answer.is_string() {
                return Err(CoreError::Validation("Answer must be text".into()));
            }
        }
        _ => {}
    }

    Ok(())
}

/// Read a numeric `min`/`max` constraint. Numeric strings are accepted.
fn constraint_number(constraints: Option<&Value>, key: &str) -> Option<serde_json::Number> {
    match constraints?.get(key)? {
        Value::Number(n) => Some(n.clone()),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64),
        _ => None,
    }
}

// ---------------------------------------------------------------------------
// Redirects
// ---------------------------------------------------------------------------

pub const REDIRECT_DOMAIN_SELECTION: &str = "domain_selection";
pub const REDIRECT_INVALID_DOMAIN: &str = "invalid_domain";
pub const REDIRECT_PAYMENT_REQUIRED: &str = "payment_required";
pub const REDIRECT_LOGIN_REQUIRED: &str = "login_required";
pub const REDIRECT_DOMAIN_FLOW: &str = "domain_flow";

/// Where to send the client after the last onboarding step.
///
/// Checks run in order: domain chosen, domain valid, paid, linked.
pub fn determine_redirect(
    selected_domain: Option<&str>,
    is_paid: bool,
    is_linked: bool,
) -> &'static str {
    let Some(domain) = selected_domain.filter(|d| !d.is_empty()) else {
        return REDIRECT_DOMAIN_SELECTION;
    };
    if !is_valid_domain(domain) {
        return REDIRECT_INVALID_DOMAIN;
    }
    if !is_paid {
        return REDIRECT_PAYMENT_REQUIRED;
    }
    if !is_linked {
        return REDIRECT_LOGIN_REQUIRED;
    }
    REDIRECT_DOMAIN_FLOW
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Answered/total counts for a step, a domain, or the whole flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StepProgress {
    pub total: usize,
    pub answered: usize,
    pub completed: bool,
}

impl StepProgress {
    pub fn new(total: usize, answered: usize) -> Self {
        Self {
            total,
            answered,
            completed: answered == total && total > 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Wellness metrics
// ---------------------------------------------------------------------------

/// Metric name and the keywords that identify its question, in match order.
pub const WELLNESS_KEYWORDS: &[(&str, &[&str])] = &[
    ("height", &["height"]),
    ("weight", &["weight"]),
    ("sleep_hours", &["sleep"]),
    ("water_intake", &["water"]),
];

/// Map a question's text to the wellness metric it answers, if any.
pub fn match_wellness_metric(question: &str) -> Option<&'static str> {
    let text = question.to_lowercase();
    WELLNESS_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(metric, _)| *metric)
}
