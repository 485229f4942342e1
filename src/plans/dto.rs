use serde::Deserialize;

/// Body for plan creation and update. Difficulty and category fall back to
/// the catalog defaults when omitted.
#[derive(Debug, Deserialize)]
pub struct PlanRequest {
    pub title: String,
    pub description: String,
    pub price: f64,
    pub duration_days: i64,
    #[serde(default = "default_difficulty")]
    pub difficulty: String,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_difficulty() -> String {
    "Beginner".to_string()
}

fn default_category() -> String {
    "General".to_string()
}
