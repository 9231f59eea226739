//! On-demand workout and meal plan generation.
//!
//! Both handlers personalize the prompt from the user's profile and
//! onboarding answers, call the LLM, and stamp the reply with
//! `generated_at`. Unlike domain completion, a model failure here is an
//! error for the caller.

use axum::extract::{Path, State};
use axum::Json;
use chrono::Utc;
use lookslab_core::domains::{DOMAIN_DIET, DOMAIN_WORKOUT};
use lookslab_core::error::CoreError;
use lookslab_core::nutrition::{
    activity_from_answer, calculate_calorie_target, parse_height_cm, parse_weight_kg,
    ActivityLevel, DietFocus, DEFAULT_AGE, DEFAULT_GENDER, DEFAULT_HEIGHT_CM, DEFAULT_WEIGHT_KG,
    MAX_CALORIE_TARGET, MIN_CALORIE_TARGET,
};
use lookslab_core::workout::{
    WorkoutFocus, WorkoutProfile, DEFAULT_DURATION_MINUTES, DEFAULT_INTENSITY,
    MAX_DURATION_MINUTES, MIN_DURATION_MINUTES,
};
use lookslab_db::models::onboarding::OnboardingAnswerDetail;
use lookslab_db::models::user::User;
use lookslab_db::repositories::{OnboardingAnswerRepo, UserRepo};
use serde::Deserialize;
use serde_json::Value;
use validator::Validate;

use crate::ai::plans::{meal_plan_prompt, workout_plan_prompt, MealPlanInputs};
use crate::ai::LlmClient;
use crate::error::{AppError, AppResult};
use crate::handlers::users::WellnessMetrics;
use crate::middleware::auth::AuthUser;
use crate::middleware::rate_limit::{AiClass, RateLimit};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateWorkoutPlan {
    pub focus: WorkoutFocus,
    #[serde(default = "default_intensity")]
    pub intensity: String,
    #[serde(default = "default_activity_level")]
    pub activity_level: String,
    #[serde(default = "default_duration")]
    #[validate(range(min = MIN_DURATION_MINUTES, max = MAX_DURATION_MINUTES))]
    pub duration_minutes: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct GenerateMealPlan {
    pub focus: DietFocus,
    #[validate(range(min = MIN_CALORIE_TARGET, max = MAX_CALORIE_TARGET))]
    pub calorie_target: Option<i32>,
    #[serde(default = "default_meal_count")]
    #[validate(range(min = 2, max = 6))]
    pub meal_count: u32,
    #[serde(default = "default_snack_count")]
    #[validate(range(max = 4))]
    pub snack_count: u32,
    #[serde(default)]
    pub dietary_preferences: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    pub cuisine_preference: Option<String>,
}

fn default_intensity() -> String {
    DEFAULT_INTENSITY.to_string()
}

fn default_activity_level() -> String {
    ActivityLevel::Moderate.as_str().to_string()
}

fn default_duration() -> i32 {
    DEFAULT_DURATION_MINUTES
}

fn default_meal_count() -> u32 {
    3
}

fn default_snack_count() -> u32 {
    2
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/domains/workout/generate-plan
pub async fn generate_workout_plan(
    auth: AuthUser,
    _limit: RateLimit<AiClass>,
    State(state): State<AppState>,
    Path(domain): Path<String>,
    Json(input): Json<GenerateWorkoutPlan>,
) -> AppResult<Json<Value>> {
    require_domain(&domain, DOMAIN_WORKOUT)?;
    validate_request(&input)?;
    let llm = llm_client(&state)?;

    let user = load_user(&state, auth.user_id).await?;
    let answers = OnboardingAnswerRepo::list_details_for_user(&state.pool, auth.user_id).await?;
    let profile = workout_profile(&user, &answers);

    let prompt = workout_plan_prompt(
        input.focus,
        &profile,
        &input.intensity,
        &input.activity_level,
        input.duration_minutes,
    );
    let plan = generate(llm, &prompt, "workout_plan").await?;

    tracing::info!(
        user_id = auth.user_id,
        focus = input.focus.as_str(),
        duration_minutes = input.duration_minutes,
        "Generated workout plan",
    );
    Ok(Json(plan))
}

/// POST /api/v1/domains/diet/generate-meal-plan
pub async fn generate_meal_plan(
    auth: AuthUser,
    _limit: RateLimit<AiClass>,
    State(state): State<AppState>,
    Path(domain): Path<String>,
    Json(input): Json<GenerateMealPlan>,
) -> AppResult<Json<Value>> {
    require_domain(&domain, DOMAIN_DIET)?;
    validate_request(&input)?;
    let llm = llm_client(&state)?;

    let user = load_user(&state, auth.user_id).await?;
    let answers = OnboardingAnswerRepo::list_details_for_user(&state.pool, auth.user_id).await?;
    let inputs = meal_plan_inputs(&user, &answers, input);

    let prompt = meal_plan_prompt(&inputs);
    let plan = generate(llm, &prompt, "meal_plan").await?;

    tracing::info!(
        user_id = auth.user_id,
        focus = inputs.focus.as_str(),
        calories = inputs.calorie_target,
        "Generated meal plan",
    );
    Ok(Json(plan))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Plan routes share the `/domains/{domain}` prefix but exist for one domain each.
fn require_domain(domain: &str, expected: &str) -> AppResult<()> {
    if domain == expected {
        Ok(())
    } else {
        Err(AppError::Core(CoreError::NotFoundMessage(format!(
            "No plan generator for domain '{domain}'"
        ))))
    }
}

fn validate_request(input: &impl Validate) -> AppResult<()> {
    input
        .validate()
        .map_err(|e| AppError::Core(CoreError::UnprocessableEntity(e.to_string())))
}

fn llm_client(state: &AppState) -> AppResult<&dyn LlmClient> {
    state
        .llm
        .as_deref()
        .ok_or_else(|| AppError::InternalError("AI client is not configured".into()))
}

async fn load_user(state: &AppState, user_id: i64) -> AppResult<User> {
    UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))
}

async fn generate(llm: &dyn LlmClient, prompt: &str, label: &str) -> AppResult<Value> {
    let mut plan = llm.generate_json(prompt, label).await.map_err(|e| {
        tracing::error!(plan = label, error = %e, "Plan generation failed");
        AppError::InternalError(format!("Failed to generate {label}: {e}"))
    })?;

    if let Value::Object(map) = &mut plan {
        map.insert("generated_at".into(), Value::String(Utc::now().to_rfc3339()));
    }
    Ok(plan)
}

/// Text of a stored answer: strings verbatim, anything else as JSON.
fn answer_text(answer: &Value) -> String {
    match answer {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn workout_profile(user: &User, answers: &[OnboardingAnswerDetail]) -> WorkoutProfile {
    let mut profile = WorkoutProfile {
        age: user.age,
        gender: user.gender.clone(),
        ..WorkoutProfile::default()
    };
    for answer in answers {
        profile.absorb_answer(&answer.question, &answer_text(&answer.answer));
    }
    profile
}

fn meal_plan_inputs(
    user: &User,
    answers: &[OnboardingAnswerDetail],
    request: GenerateMealPlan,
) -> MealPlanInputs {
    let wellness = WellnessMetrics::from_answers(answers, "");
    let weight_kg = wellness
        .weight
        .as_ref()
        .and_then(|w| parse_weight_kg(&answer_text(w)))
        .unwrap_or(DEFAULT_WEIGHT_KG);
    let height_cm = wellness
        .height
        .as_ref()
        .and_then(|h| parse_height_cm(&answer_text(h)))
        .unwrap_or(DEFAULT_HEIGHT_CM);

    let activity = answers
        .iter()
        .filter(|a| {
            let q = a.question.to_lowercase();
            q.contains("activity") || q.contains("exercise")
        })
        .filter_map(|a| activity_from_answer(&answer_text(&a.answer)))
        .last()
        .unwrap_or(ActivityLevel::Moderate);

    let age = user.age.unwrap_or(DEFAULT_AGE);
    let gender = user
        .gender
        .clone()
        .unwrap_or_else(|| DEFAULT_GENDER.to_string());

    let calorie_target = request.calorie_target.unwrap_or_else(|| {
        calculate_calorie_target(weight_kg, height_cm, age, &gender, activity, request.focus)
    });

    MealPlanInputs {
        focus: request.focus,
        calorie_target,
        meal_count: request.meal_count,
        snack_count: request.snack_count,
        age,
        gender,
        weight_kg,
        height_cm,
        activity_level: activity.as_str().to_string(),
        dietary_preferences: request.dietary_preferences,
        allergies: request.allergies,
        cuisine_preference: request.cuisine_preference,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn user(age: Option<i32>, gender: Option<&str>) -> User {
        let now = Utc::now();
        User {
            id: 1,
            email: "a@example.com".into(),
            name: None,
            provider: Some("google".into()),
            is_active: true,
            is_verified: true,
            onboarding_complete: true,
            google_sub: None,
            google_picture: None,
            last_google_id_token: None,
            apple_sub: None,
            last_apple_id_token: None,
            age,
            gender: gender.map(str::to_string),
            profile_image: None,
            notifications_enabled: true,
            last_login: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn answer(step: &str, question: &str, value: Value) -> OnboardingAnswerDetail {
        OnboardingAnswerDetail {
            question_id: 1,
            step: step.into(),
            question: question.into(),
            question_type: "text".into(),
            answer: value,
            completed_at: Utc::now(),
        }
    }

    fn meal_request(calorie_target: Option<i32>) -> GenerateMealPlan {
        serde_json::from_value(json!({
            "focus": "maintenance",
            "calorie_target": calorie_target,
        }))
        .unwrap()
    }

    #[test]
    fn meal_request_defaults() {
        let req = meal_request(None);
        assert_eq!(req.meal_count, 3);
        assert_eq!(req.snack_count, 2);
        assert!(req.dietary_preferences.is_empty());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn meal_request_bounds() {
        assert!(meal_request(Some(1000)).validate().is_err());
        assert!(meal_request(Some(2500)).validate().is_ok());

        let req: GenerateMealPlan =
            serde_json::from_value(json!({"focus": "fatloss", "meal_count": 7})).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn workout_request_bounds() {
        let req: GenerateWorkoutPlan = serde_json::from_value(json!({"focus": "strength"})).unwrap();
        assert_eq!(req.duration_minutes, 30);
        assert_eq!(req.intensity, "moderate");
        assert!(req.validate().is_ok());

        let req: GenerateWorkoutPlan =
            serde_json::from_value(json!({"focus": "strength", "duration_minutes": 5})).unwrap();
        assert!(req.validate().is_err());
    }

    #[test]
    fn meal_inputs_use_defaults_without_answers() {
        let inputs = meal_plan_inputs(&user(None, None), &[], meal_request(None));
        assert_eq!(inputs.age, 30);
        assert_eq!(inputs.gender, "male");
        assert_eq!(inputs.weight_kg, 70.0);
        assert_eq!(inputs.activity_level, "moderate");
        // 10*70 + 6.25*170 - 5*30 + 5 = 1617.5, times 1.55.
        assert_eq!(inputs.calorie_target, 2507);
    }

    #[test]
    fn meal_inputs_read_wellness_and_activity_answers() {
        let answers = [
            answer("profile_setup", "What is your weight?", json!("80 kg")),
            answer("profile_setup", "What is your height?", json!("180 cm")),
            answer("daily_lifestyle", "How would you describe your activity level?", json!("Very active")),
        ];
        let inputs = meal_plan_inputs(&user(Some(25), Some("female")), &answers, meal_request(Some(1800)));
        assert_eq!(inputs.weight_kg, 80.0);
        assert_eq!(inputs.height_cm, 180.0);
        assert_eq!(inputs.activity_level, "active");
        assert_eq!(inputs.calorie_target, 1800);
        assert_eq!(inputs.gender, "female");
    }

    #[test]
    fn workout_profile_merges_user_and_answers() {
        let answers = [answer("experience_planning", "What equipment do you have?", json!("Kettlebell"))];
        let profile = workout_profile(&user(Some(40), Some("male")), &answers);
        assert_eq!(profile.age, Some(40));
        assert_eq!(profile.equipment, "Kettlebell");
        assert_eq!(profile.fitness_level, "beginner");
    }

    #[test]
    fn plan_routes_are_domain_specific() {
        assert!(require_domain("workout", DOMAIN_WORKOUT).is_ok());
        assert!(require_domain("diet", DOMAIN_WORKOUT).is_err());
    }
}
