//! Prompts for on-demand workout and meal plans.

use lookslab_core::nutrition::{macro_split, DietFocus};
use lookslab_core::workout::{WorkoutFocus, WorkoutProfile, PLAN_EXERCISE_COUNT};

/// Title-case a snake_case identifier: `build_muscle` -> `Build Muscle`.
pub fn title_case(s: &str) -> String {
    s.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn workout_plan_prompt(
    focus: WorkoutFocus,
    profile: &WorkoutProfile,
    intensity: &str,
    activity_level: &str,
    duration_minutes: i32,
) -> String {
    let age = profile.age.map_or_else(|| "Not specified".to_string(), |a| a.to_string());
    let gender = profile.gender.as_deref().unwrap_or("Not specified");
    let focus_value = focus.as_str();
    let n = PLAN_EXERCISE_COUNT;

    format!(
        r#"You are a professional fitness coach creating a personalized workout plan.

USER PROFILE:
- Age: {age}
- Gender: {gender}
- Fitness Level: {fitness_level}
- Activity Level: {activity_level}
- Workout Frequency: {frequency}
- Equipment Available: {equipment}
- Goals: {goals}

WORKOUT REQUIREMENTS:
- Focus Area: {focus_title} ({focus_label})
- Intensity: {intensity_title}
- Target Duration: {duration_minutes} minutes
- Exercise Count: {n} exercises

Return a JSON object with this exact structure:
{{
  "focus": "{focus_value}",
  "title": "Short catchy title",
  "description": "One-line motivational description",
  "duration_minutes": {duration_minutes},
  "exercise_count": {n},
  "intensity": "{intensity}",
  "insight": {{ "title": "Short insight title", "message": "Motivational message about consistency" }},
  "exercises": [
    {{
      "name": "Exercise name",
      "duration_seconds": 180 or null,
      "sets": 3 or null,
      "reps": 12 or null,
      "rest_seconds": 30,
      "instructions": "Clear, concise instructions",
      "benefits": "What this exercise improves",
      "difficulty": "beginner|intermediate|advanced"
    }}
  ]
}}

Rules: start with a warm-up, progress from easier to harder, finish with a cool-down,
mix time-based and rep-based exercises, keep instructions to 1-2 sentences, and return
ONLY valid JSON."#,
        fitness_level = profile.fitness_level,
        frequency = profile.workout_frequency,
        equipment = profile.equipment,
        goals = profile.goals,
        focus_title = title_case(focus_value),
        focus_label = focus.label(),
        intensity_title = title_case(intensity),
    )
}

/// Inputs to the meal plan prompt after defaults have been applied.
#[derive(Debug, Clone)]
pub struct MealPlanInputs {
    pub focus: DietFocus,
    pub calorie_target: i32,
    pub meal_count: u32,
    pub snack_count: u32,
    pub age: i32,
    pub gender: String,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub activity_level: String,
    pub dietary_preferences: Vec<String>,
    pub allergies: Vec<String>,
    pub cuisine_preference: Option<String>,
}

impl MealPlanInputs {
    /// Preferences and allergies as one comma-separated restriction line.
    pub fn restrictions(&self) -> String {
        let mut parts: Vec<String> = self.dietary_preferences.clone();
        parts.extend(self.allergies.iter().map(|a| format!("No {a}")));
        if parts.is_empty() {
            "None".to_string()
        } else {
            parts.join(", ")
        }
    }
}

pub fn meal_plan_prompt(inputs: &MealPlanInputs) -> String {
    let focus_value = inputs.focus.as_str();
    let focus_title = title_case(focus_value);
    let calories = inputs.calorie_target;
    let macros = macro_split(inputs.focus, calories);

    format!(
        r#"You are a professional nutritionist creating a personalized meal plan.

USER PROFILE:
- Age: {age}
- Gender: {gender}
- Weight: {weight} kg
- Height: {height} cm
- Activity Level: {activity}
- Dietary Preferences: {restrictions}
- Cuisine Preference: {cuisine}

MEAL PLAN REQUIREMENTS:
- Focus: {focus_title}
- Target Calories: {calories} kcal/day
- Number of Meals: {meals}
- Number of Snacks: {snacks}

MACRONUTRIENT TARGETS:
- Protein: {p_pct}% ({p_g}g)
- Carbs: {c_pct}% ({c_g}g)
- Fats: {f_pct}% ({f_g}g)

Return a JSON object with this exact structure:
{{
  "focus": "{focus_value}",
  "title": "{focus_title} Meal Plan",
  "description": "Short motivational description",
  "calories": {{ "intake": {calories}, "activity": "{activity}" }},
  "insight": {{ "title": "Nutrition Insight", "message": "Motivational message" }},
  "meal_count": {meals},
  "snack_count": {snacks},
  "total_prep_time_minutes": 0,
  "meals": [
    {{
      "type": "breakfast|lunch|dinner",
      "name": "Meal name",
      "prep_time_minutes": 15,
      "calories": 500,
      "macros": {{ "protein": 30, "carbs": 50, "fats": 15 }},
      "ingredients": ["Ingredient with quantity"],
      "instructions": ["Step 1"],
      "benefits": "Why this meal suits the focus"
    }}
  ],
  "snacks": [
    {{
      "name": "Snack name",
      "prep_time_minutes": 5,
      "calories": 200,
      "macros": {{ "protein": 10, "carbs": 20, "fats": 8 }},
      "ingredients": ["Ingredient"],
      "instructions": ["Preparation step"]
    }}
  ],
  "daily_totals": {{ "calories": {calories}, "protein": {p_g}, "carbs": {c_g}, "fats": {f_g} }}
}}

Rules: meet the macronutrient targets, keep prep times realistic (10-30 min meals,
2-10 min snacks), make total_prep_time_minutes the sum of all prep times, make
daily_totals match the sum of meals and snacks, respect preferences and allergies,
and return ONLY valid JSON."#,
        age = inputs.age,
        gender = inputs.gender,
        weight = inputs.weight_kg,
        height = inputs.height_cm,
        activity = inputs.activity_level,
        restrictions = inputs.restrictions(),
        cuisine = inputs.cuisine_preference.as_deref().unwrap_or("Any"),
        meals = inputs.meal_count,
        snacks = inputs.snack_count,
        p_pct = macros.protein_pct,
        p_g = macros.protein_g,
        c_pct = macros.carbs_pct,
        c_g = macros.carbs_g,
        f_pct = macros.fat_pct,
        f_g = macros.fat_g,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_case_words() {
        assert_eq!(title_case("build_muscle"), "Build Muscle");
        assert_eq!(title_case("fatloss"), "Fatloss");
        assert_eq!(title_case("very_active"), "Very Active");
    }

    #[test]
    fn workout_prompt_carries_profile() {
        let profile = WorkoutProfile {
            age: Some(28),
            equipment: "Dumbbells".into(),
            ..WorkoutProfile::default()
        };
        let prompt = workout_plan_prompt(WorkoutFocus::Strength, &profile, "high", "active", 45);
        assert!(prompt.contains("- Age: 28"));
        assert!(prompt.contains("- Gender: Not specified"));
        assert!(prompt.contains("Dumbbells"));
        assert!(prompt.contains("\"duration_minutes\": 45"));
        assert!(prompt.contains("\"focus\": \"strength\""));
    }

    #[test]
    fn meal_prompt_has_macros_and_restrictions() {
        let inputs = MealPlanInputs {
            focus: DietFocus::BuildMuscle,
            calorie_target: 2000,
            meal_count: 3,
            snack_count: 2,
            age: 30,
            gender: "male".into(),
            weight_kg: 70.0,
            height_cm: 170.0,
            activity_level: "moderate".into(),
            dietary_preferences: vec!["Vegetarian".into()],
            allergies: vec!["peanuts".into()],
            cuisine_preference: None,
        };
        assert_eq!(inputs.restrictions(), "Vegetarian, No peanuts");
        let prompt = meal_plan_prompt(&inputs);
        assert!(prompt.contains("- Protein: 30% (150g)"));
        assert!(prompt.contains("- Cuisine Preference: Any"));
        assert!(prompt.contains("\"title\": \"Build Muscle Meal Plan\""));
    }
}
