use serde::{Deserialize, Serialize};

/// Body for subscribing to a plan. The amount is recorded as paid; no
/// payment gateway is involved, callers pass the plan price.
#[derive(Debug, Deserialize)]
pub struct SubscribeRequest {
    pub plan_id: i64,
    pub amount: f64,
}

#[derive(Debug, Serialize)]
pub struct ActiveResponse {
    pub active: bool,
}
