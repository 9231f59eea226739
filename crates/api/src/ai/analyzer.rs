//! Domain analysis: prompt construction and output shaping.
//!
//! Each domain gets an expert persona and a JSON schema hint. Skincare
//! output is normalized into fixed shapes the mobile client renders
//! directly; other domains are passed through as returned.

use lookslab_core::domains::{
    DOMAIN_DIET, DOMAIN_FACIAL, DOMAIN_FASHION, DOMAIN_HAIRCARE, DOMAIN_HEIGHT, DOMAIN_QUIT_PORN,
    DOMAIN_SKINCARE, DOMAIN_WORKOUT,
};
use lookslab_db::models::domain::DomainAnswerDetail;
use lookslab_db::models::image::Image;
use serde::Serialize;
use serde_json::{json, Map, Value};

use super::{generate_json_or, LlmClient};

pub const DEFAULT_SKINCARE_MESSAGE: &str =
    "Consistency is key, your skin will thank you with a healthy glow!";

const MAX_ROUTINE_ITEMS: usize = 5;
const MAX_REMEDIES: usize = 5;
const MAX_PRODUCTS: usize = 3;

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Prompt context: the answers in question order plus which image views exist.
pub fn build_context(answers: &[DomainAnswerDetail], images: &[Image]) -> Value {
    let answers: Vec<Value> = answers
        .iter()
        .map(|a| json!({ "step": a.seq, "question": a.question, "answer": a.answer }))
        .collect();
    let images: Vec<Value> = images
        .iter()
        .map(|i| {
            let present = i.url.as_deref().or(i.s3_key.as_deref()).is_some_and(|s| !s.is_empty());
            json!({ "view": i.view, "present": present })
        })
        .collect();
    json!({ "answers": answers, "images": images })
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

fn persona(domain: &str) -> &'static str {
    match domain {
        DOMAIN_SKINCARE => "You are an expert skincare assistant. Use the user's answers and optional face images to produce a concise, safe skincare plan.",
        DOMAIN_HAIRCARE => "You are an expert haircare assistant. Use the user's answers and optional images to produce a concise, safe haircare plan.",
        DOMAIN_FACIAL => "You are a facial analysis and grooming assistant. Use the user's answers and face scans to build a personalized facial improvement plan.",
        DOMAIN_FASHION => "You are an expert fashion stylist. Use the user's answers and body scans to build a personalized style profile.",
        DOMAIN_WORKOUT => "You are a certified fitness coach. Use the user's answers to build a personalized workout plan.",
        DOMAIN_DIET => "You are a certified nutritionist. Use the user's answers to build a personalized diet plan.",
        DOMAIN_HEIGHT => "You are a posture and growth optimization coach. Use the user's answers to build a personalized height improvement plan.",
        DOMAIN_QUIT_PORN => "You are a behavioral wellness coach helping users reduce or quit porn. Use their answers to build a safe, structured recovery plan.",
        _ => "You are a wellness assistant. Use the user's answers to build a personalized plan.",
    }
}

const CONFIDENCE: &str = r#"{ "label": "...", "confidence": 0-100 }"#;

fn schema_hint(domain: &str) -> String {
    let c = CONFIDENCE;
    match domain {
        DOMAIN_SKINCARE => format!(
            r#"{{
  "attributes": {{ "skin_type": {c}, "sensitivity": {c}, "elasticity": {c}, "oil_balance": {c}, "hydration": {c}, "pore_visibility": {c} }},
  "health": {{ "skin_health": {c}, "texture": {c}, "skin_barrier": {c}, "smoothness": {c}, "brightness": {c} }},
  "concerns": {{ "acne_breakouts": {c}, "pigmentation": {c}, "darkness_spot": {c}, "wrinkles": {c}, "uneven_tone": {c} }},
  "routine": {{ "today": [{{ "title": "...", "description": "..." }}], "night": [{{ "title": "...", "description": "..." }}] }},
  "remedies": [{{ "name": "...", "steps": ["..."] }}],
  "safety_tips": ["..."],
  "products": [{{ "name": "...", "tags": ["..."], "time_of_day": "AM|PM|AM/PM", "overview": "...", "how_to_use": ["..."], "when_to_use": "...", "dont_use_with": ["..."], "confidence": 0-100 }}],
  "motivational_message": "..."
}}"#
        ),
        DOMAIN_HAIRCARE => format!(
            r#"{{
  "attributes": {{ "density": {c}, "hair_type": {c}, "volume": {c}, "texture": {c} }},
  "health": {{ "scalp_health": {c}, "breakage": {c}, "frizz_dryness": {c}, "dandruff": {c} }},
  "concerns": {{ "hairloss": {c}, "hairline_recession": {c}, "stage": {c} }},
  "routine": {{ "today": [{{ "title": "...", "description": "..." }}], "night": [{{ "title": "...", "description": "..." }}] }},
  "remedies": [{{ "name": "...", "steps": ["..."] }}],
  "products": [{{ "name": "...", "tags": ["..."], "overview": "...", "how_to_use": ["..."] }}],
  "motivational_message": "..."
}}"#
        ),
        DOMAIN_FACIAL => r#"{
  "attributes": { "symmetry": "...", "jawline": "...", "cheekbones": "...", "habits": ["..."], "feature_goal": "...", "exercise_time": "..." },
  "feature_scores": { "overall_score": 0-100, "features": [{ "name": "...", "label": "...", "score": 0-100 }] },
  "daily_exercises": [{ "seq": 1, "title": "...", "duration": "...", "steps": ["..."] }],
  "progress_tracking": { "jawline_score": 0-100, "cheekbones_score": 0-100, "symmetry_score": 0-100, "consistency": "...", "recovery_checklist": ["..."] },
  "motivational_message": "..."
}"#
        .to_string(),
        DOMAIN_FASHION => r#"{
  "attributes": { "body_type": "...", "undertone": "...", "style": "...", "best_clothing_fits": ["..."], "styles_to_avoid": ["..."], "warm_palette": ["..."] },
  "weekly_plan": [{ "day": "Monday", "theme": "..." }],
  "seasonal_style": { "summer": { "outfit_combinations": ["..."], "recommended_fabrics": ["..."], "footwear": ["..."] }, "monsoon": {}, "winter": {} },
  "motivational_message": "..."
}"#
        .to_string(),
        DOMAIN_WORKOUT => r#"{
  "attributes": { "intensity": "...", "activity": "...", "goal": "...", "diet_type": "...", "today_focus": ["..."], "posture_insight": "..." },
  "workout_summary": "...",
  "exercises": { "morning": [{ "seq": 1, "title": "...", "duration": "...", "steps": ["..."] }], "evening": [] },
  "progress_tracking": { "weekly_calories": 0, "consistency": "...", "strength_gain": "...", "fitness_consistency": "...", "recovery_checklist": ["..."] },
  "motivational_message": "..."
}"#
        .to_string(),
        DOMAIN_DIET => r#"{
  "attributes": { "calories_intake": 0, "activity": "...", "goal": "...", "diet_type": "...", "today_focus": ["..."], "meals_summary": "..." },
  "nutrition_targets": { "daily_calories": 0, "protein_g": 0, "carbs_g": 0, "fat_g": 0, "water_glasses": 0, "fiber_g": 0 },
  "routine": { "morning": [{ "seq": 1, "title": "...", "description": "...", "time": "..." }], "evening": [] },
  "progress_tracking": { "daily_calories": 0, "consistency": "...", "nutrition_balance": "...", "calorie_balance": "...", "recovery_checklist": ["..."] },
  "motivational_message": "..."
}"#
        .to_string(),
        DOMAIN_HEIGHT => r#"{
  "attributes": { "current_height": "...", "goal_height": "...", "growth_potential": "...", "posture_status": "...", "bmi_status": "..." },
  "today_focus": [{ "title": "...", "duration": "..." }],
  "daily_exercises": { "morning": [{ "seq": 1, "title": "...", "duration": "...", "steps": ["..."] }], "evening": [] },
  "progress_tracking": { "completion_percent": 0, "posture_gain_cm": 0, "consistency": "..." },
  "motivational_message": "..."
}"#
        .to_string(),
        DOMAIN_QUIT_PORN => r#"{
  "attributes": { "frequency": "...", "triggers": ["..."], "urge_timing": ["..."], "coping_mechanisms": "...", "commitment_level": "..." },
  "recovery_path": { "streak": { "current": 0, "longest": 0, "next_goal": 0, "message": "..." }, "daily_tasks": ["..."], "exercises": ["..."] },
  "progress_tracking": { "consistency": "...", "recovery_score": 0-100, "recovery_checklist": ["..."] },
  "motivational_message": "..."
}"#
        .to_string(),
        _ => r#"{ "attributes": {}, "motivational_message": "..." }"#.to_string(),
    }
}

/// The full analysis prompt for `domain` given the answer/image context.
pub fn build_prompt(domain: &str, context: &Value) -> String {
    format!(
        "{persona}\n\n\
         Return STRICT JSON ONLY, no markdown, matching this schema:\n{schema}\n\n\
         Keep recommendations safe and non-medical. Fill every field.\n\n\
         USER CONTEXT:\n{context}\n",
        persona = persona(domain),
        schema = schema_hint(domain),
        context = context,
    )
}

// ---------------------------------------------------------------------------
// Skincare normalization
// ---------------------------------------------------------------------------

fn confidence(section: Option<&Value>, key: &str, default_label: &str) -> Value {
    match section.and_then(|s| s.get(key)) {
        None => json!({ "label": default_label, "confidence": 0 }),
        Some(Value::Object(obj)) => json!({
            "label": obj.get("label").cloned().unwrap_or_else(|| json!(default_label)),
            "confidence": obj.get("confidence").cloned().unwrap_or_else(|| json!(0)),
        }),
        Some(Value::String(s)) => json!({ "label": s, "confidence": 0 }),
        Some(other) => json!({ "label": other.to_string(), "confidence": 0 }),
    }
}

fn confidence_group(raw: &Value, section: &str, keys: &[(&str, &str)]) -> Value {
    let section = raw.get(section);
    let map: Map<String, Value> = keys
        .iter()
        .map(|(key, default)| (key.to_string(), confidence(section, key, default)))
        .collect();
    Value::Object(map)
}

fn string_or(value: Option<&Value>, default: &str) -> Value {
    match value {
        Some(v) if !v.is_null() => v.clone(),
        _ => json!(default),
    }
}

fn list_or_empty(value: Option<&Value>) -> Value {
    match value {
        Some(Value::Array(items)) => Value::Array(items.clone()),
        _ => json!([]),
    }
}

fn routine_items(value: Option<&Value>) -> Vec<Value> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .take(MAX_ROUTINE_ITEMS)
                .filter(|i| i.is_object())
                .map(|i| {
                    json!({
                        "title": string_or(i.get("title"), ""),
                        "description": string_or(i.get("description"), ""),
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn normalize_remedies(raw: &Value) -> Value {
    let remedies: Vec<Value> = raw
        .get("remedies")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .take(MAX_REMEDIES)
                .filter_map(|r| match r {
                    Value::Object(_) => Some((string_or(r.get("name"), ""), list_or_empty(r.get("steps")))),
                    Value::String(s) => Some((json!(s), json!([]))),
                    _ => None,
                })
                .enumerate()
                .map(|(i, (name, steps))| json!({ "index": i + 1, "name": name, "steps": steps }))
                .collect()
        })
        .unwrap_or_default();

    let safety_tips: Vec<Value> = raw
        .get("safety_tips")
        .and_then(Value::as_array)
        .map(|tips| {
            tips.iter()
                .filter(|t| !t.is_null() && t.as_str() != Some(""))
                .map(|t| match t {
                    Value::String(_) => t.clone(),
                    other => json!(other.to_string()),
                })
                .collect()
        })
        .unwrap_or_default();

    json!({ "remedies": remedies, "safety_tips": safety_tips })
}

fn normalize_products(raw: &Value) -> Value {
    let products: Vec<Value> = raw
        .get("products")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter(|p| p.is_object())
                .take(MAX_PRODUCTS)
                .map(|p| {
                    json!({
                        "name": string_or(p.get("name"), "Product"),
                        "tags": list_or_empty(p.get("tags")),
                        "time_of_day": string_or(p.get("time_of_day"), "AM/PM"),
                        "overview": string_or(p.get("overview"), ""),
                        "how_to_use": list_or_empty(p.get("how_to_use")),
                        "when_to_use": string_or(p.get("when_to_use"), "Daily"),
                        "dont_use_with": list_or_empty(p.get("dont_use_with")),
                        "confidence": p.get("confidence").cloned().unwrap_or_else(|| json!(0)),
                    })
                })
                .collect()
        })
        .unwrap_or_default();
    Value::Array(products)
}

/// Force a raw skincare response into the fixed shape the client renders.
pub fn normalize_skincare(raw: &Value) -> Value {
    let routine = raw.get("routine");
    json!({
        "attributes": confidence_group(raw, "attributes", &[
            ("skin_type", "Normal"),
            ("sensitivity", "Low"),
            ("elasticity", "Moderate"),
            ("oil_balance", "Balanced"),
            ("hydration", "Moderate"),
            ("pore_visibility", "Low"),
        ]),
        "health": confidence_group(raw, "health", &[
            ("skin_health", "Healthy"),
            ("texture", "Smooth"),
            ("skin_barrier", "Strong"),
            ("smoothness", "Smooth"),
            ("brightness", "Bright"),
        ]),
        "concerns": confidence_group(raw, "concerns", &[
            ("acne_breakouts", "None"),
            ("pigmentation", "None"),
            ("darkness_spot", "None"),
            ("wrinkles", "None"),
            ("uneven_tone", "None"),
        ]),
        "routine": {
            "today": routine_items(routine.and_then(|r| r.get("today"))),
            "night": routine_items(routine.and_then(|r| r.get("night"))),
        },
        "remedies": normalize_remedies(raw),
        "products": normalize_products(raw),
        "motivational_message": string_or(raw.get("motivational_message"), DEFAULT_SKINCARE_MESSAGE),
    })
}

/// Apply per-domain output shaping.
pub fn shape_output(domain: &str, raw: Value) -> Value {
    if domain == DOMAIN_SKINCARE {
        normalize_skincare(&raw)
    } else {
        raw
    }
}

/// Build the prompt, call the model, and shape the result. `None` when the
/// model call failed; the error is logged by [`generate_json_or`].
pub async fn analyze(
    client: &dyn LlmClient,
    domain: &str,
    answers: &[DomainAnswerDetail],
    images: &[Image],
) -> Option<Value> {
    tracing::info!(domain, answers = answers.len(), images = images.len(), "Starting domain analysis");
    let context = build_context(answers, images);
    let prompt = build_prompt(domain, &context);
    match generate_json_or(client, &prompt, domain, Value::Null).await {
        Value::Null => None,
        raw => Some(shape_output(domain, raw)),
    }
}

// ---------------------------------------------------------------------------
// Flow response fields
// ---------------------------------------------------------------------------

/// AI output mapped onto the completed-flow response fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AiFields {
    pub ai_attributes: Option<Value>,
    pub ai_health: Option<Value>,
    pub ai_concerns: Option<Value>,
    pub ai_message: Option<Value>,
    pub ai_remedies: Option<Value>,
    pub ai_products: Option<Value>,
    pub ai_routine: Option<Value>,
    pub ai_exercises: Option<Value>,
    pub ai_progress: Option<Value>,
    pub ai_today_focus: Option<Value>,
    pub ai_workout_summary: Option<Value>,
    pub ai_nutrition: Option<Value>,
    pub ai_recovery: Option<Value>,
    pub ai_features: Option<Value>,
}

impl AiFields {
    pub fn from_output(output: &Value) -> Self {
        let get = |key: &str| output.get(key).filter(|v| !v.is_null()).cloned();
        Self {
            ai_attributes: get("attributes"),
            ai_health: get("health"),
            ai_concerns: get("concerns"),
            ai_message: get("motivational_message"),
            ai_remedies: get("remedies"),
            ai_products: get("products"),
            ai_routine: get("routine"),
            ai_exercises: get("daily_exercises"),
            ai_progress: get("progress_tracking"),
            ai_today_focus: get("today_focus"),
            ai_workout_summary: get("workout_summary"),
            ai_nutrition: get("nutrition_targets"),
            ai_recovery: get("recovery_path"),
            ai_features: get("feature_scores"),
        }
    }
}
