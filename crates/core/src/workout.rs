//! Workout plan request parameters.

use serde::{Deserialize, Serialize};

pub const MIN_DURATION_MINUTES: i32 = 10;
pub const MAX_DURATION_MINUTES: i32 = 120;
pub const DEFAULT_DURATION_MINUTES: i32 = 30;
pub const DEFAULT_INTENSITY: &str = "moderate";

/// Number of exercises a generated plan should contain.
pub const PLAN_EXERCISE_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkoutFocus {
    Flexibility,
    BuildMuscle,
    Fatloss,
    Strength,
}

impl WorkoutFocus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flexibility => "flexibility",
            Self::BuildMuscle => "build_muscle",
            Self::Fatloss => "fatloss",
            Self::Strength => "strength",
        }
    }

    /// Human wording used in prompts and plan titles.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Flexibility => "flexibility and mobility",
            Self::BuildMuscle => "muscle building (hypertrophy)",
            Self::Fatloss => "fat loss and conditioning",
            Self::Strength => "maximal strength",
        }
    }
}

/// Personal context pulled from the profile and onboarding answers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutProfile {
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub fitness_level: String,
    pub workout_frequency: String,
    pub equipment: String,
    pub goals: String,
}

impl Default for WorkoutProfile {
    fn default() -> Self {
        Self {
            age: None,
            gender: None,
            fitness_level: "beginner".into(),
            workout_frequency: "3 times per week".into(),
            equipment: "None".into(),
            goals: "General fitness".into(),
        }
    }
}

impl WorkoutProfile {
    /// Fill a profile field from an onboarding answer, matched on question text.
    ///
    /// Later answers overwrite earlier ones.
    pub fn absorb_answer(&mut self, question: &str, answer: &str) {
        let q = question.to_lowercase();
        let slot = if q.contains("fitness level") || q.contains("experience") {
            &mut self.fitness_level
        } else if q.contains("workout") && q.contains("frequency") {
            &mut self.workout_frequency
        } else if q.contains("equipment") {
            &mut self.equipment
        } else if q.contains("goal") {
            &mut self.goals
        } else {
            return;
        };
        *slot = answer.to_string();
    }
}
