//! Calorie and macronutrient math for meal plan generation.

use serde::{Deserialize, Serialize};

/// Fallback profile values used when onboarding answers are missing.
pub const DEFAULT_WEIGHT_KG: f64 = 70.0;
pub const DEFAULT_HEIGHT_CM: f64 = 170.0;
pub const DEFAULT_AGE: i32 = 30;
pub const DEFAULT_GENDER: &str = "male";

pub const MIN_CALORIE_TARGET: i32 = 1200;
pub const MAX_CALORIE_TARGET: i32 = 4000;

const CM_PER_FOOT: f64 = 30.48;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DietFocus {
    BuildMuscle,
    Maintenance,
    CleanEnergetic,
    Fatloss,
}

impl DietFocus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BuildMuscle => "build_muscle",
            Self::Maintenance => "maintenance",
            Self::CleanEnergetic => "clean_energetic",
            Self::Fatloss => "fatloss",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sedentary => "sedentary",
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::Active => "active",
            Self::VeryActive => "very_active",
        }
    }

    /// TDEE multiplier applied to BMR.
    pub fn multiplier(&self) -> f64 {
        match self {
            Self::Sedentary => 1.2,
            Self::Light => 1.375,
            Self::Moderate => 1.55,
            Self::Active => 1.725,
            Self::VeryActive => 1.9,
        }
    }
}

/// Daily calorie target from the Mifflin-St Jeor equation, adjusted for focus.
pub fn calculate_calorie_target(
    weight_kg: f64,
    height_cm: f64,
    age: i32,
    gender: &str,
    activity: ActivityLevel,
    focus: DietFocus,
) -> i32 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    let bmr = if gender.eq_ignore_ascii_case("male") {
        base + 5.0
    } else {
        base - 161.0
    };
    let tdee = bmr * activity.multiplier();
    let target = match focus {
        DietFocus::BuildMuscle => tdee + 300.0,
        DietFocus::Fatloss => tdee - 500.0,
        DietFocus::Maintenance | DietFocus::CleanEnergetic => tdee,
    };
    target as i32
}

/// Macronutrient split as percentages and gram targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MacroSplit {
    pub protein_pct: i32,
    pub carbs_pct: i32,
    pub fat_pct: i32,
    pub protein_g: i32,
    pub carbs_g: i32,
    pub fat_g: i32,
}

pub fn macro_split(focus: DietFocus, calories: i32) -> MacroSplit {
    let (protein_pct, carbs_pct, fat_pct) = match focus {
        DietFocus::BuildMuscle => (30, 45, 25),
        DietFocus::Fatloss => (35, 35, 30),
        DietFocus::CleanEnergetic => (25, 50, 25),
        DietFocus::Maintenance => (30, 40, 30),
    };
    let grams = |pct: i32, kcal_per_g: f64| (f64::from(calories) * f64::from(pct) / 100.0 / kcal_per_g) as i32;
    MacroSplit {
        protein_pct,
        carbs_pct,
        fat_pct,
        protein_g: grams(protein_pct, 4.0),
        carbs_g: grams(carbs_pct, 4.0),
        fat_g: grams(fat_pct, 9.0),
    }
}

/// Parse a free-text weight answer such as `"76 kg"` or `76`.
pub fn parse_weight_kg(answer: &str) -> Option<f64> {
    answer.split_whitespace().next()?.parse().ok()
}

/// Parse a free-text height answer: `"5.2 ft"` converts to cm, `"170 cm"` passes through.
pub fn parse_height_cm(answer: &str) -> Option<f64> {
    let lower = answer.to_lowercase();
    let value: f64 = lower.split_whitespace().next()?.parse().ok()?;
    if lower.contains("ft") {
        Some(value * CM_PER_FOOT)
    } else if lower.contains("cm") {
        Some(value)
    } else {
        None
    }
}

/// Map an onboarding activity answer ("Moderately active") to a level.
pub fn activity_from_answer(answer: &str) -> Option<ActivityLevel> {
    const PHRASES: &[(&str, ActivityLevel)] = &[
        ("sedentary", ActivityLevel::Sedentary),
        ("lightly active", ActivityLevel::Light),
        ("moderately active", ActivityLevel::Moderate),
        ("very active", ActivityLevel::Active),
        ("extremely active", ActivityLevel::VeryActive),
    ];
    let lower = answer.to_lowercase();
    PHRASES
        .iter()
        .find(|(phrase, _)| lower.contains(phrase))
        .map(|(_, level)| *level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calorie_target_for_default_male() {
        // BMR = 700 + 1062.5 - 150 + 5 = 1617.5; TDEE = 2507.125
        let maintain = calculate_calorie_target(
            70.0,
            170.0,
            30,
            "male",
            ActivityLevel::Moderate,
            DietFocus::Maintenance,
        );
        assert_eq!(maintain, 2507);

        let bulk = calculate_calorie_target(
            70.0,
            170.0,
            30,
            "Male",
            ActivityLevel::Moderate,
            DietFocus::BuildMuscle,
        );
        assert_eq!(bulk, 2807);
    }

    #[test]
    fn calorie_target_for_female_cut() {
        // BMR = 600 + 1000 - 125 - 161 = 1314; TDEE = 1576.8; -500
        let cut = calculate_calorie_target(
            60.0,
            160.0,
            25,
            "female",
            ActivityLevel::Sedentary,
            DietFocus::Fatloss,
        );
        assert_eq!(cut, 1076);
    }

    #[test]
    fn macro_grams_from_percentages() {
        let split = macro_split(DietFocus::BuildMuscle, 2000);
        assert_eq!((split.protein_pct, split.carbs_pct, split.fat_pct), (30, 45, 25));
        assert_eq!(split.protein_g, 150);
        assert_eq!(split.carbs_g, 225);
        assert_eq!(split.fat_g, 55);
    }

    #[test]
    fn parses_free_text_measurements() {
        assert_eq!(parse_weight_kg("76 kg"), Some(76.0));
        assert_eq!(parse_weight_kg("heavy"), None);
        assert_eq!(parse_height_cm("170 cm"), Some(170.0));
        let ft = parse_height_cm("5.5 ft").unwrap();
        assert!((ft - 167.64).abs() < 1e-9);
        assert_eq!(parse_height_cm("170"), None);
    }

    #[test]
    fn activity_phrases() {
        assert_eq!(activity_from_answer("Moderately Active"), Some(ActivityLevel::Moderate));
        assert_eq!(activity_from_answer("extremely active"), Some(ActivityLevel::VeryActive));
        assert_eq!(activity_from_answer("couch"), None);
    }
}
