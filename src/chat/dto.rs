use serde::{Deserialize, Serialize};

/// Body for sending a direct message. Sending is the one operation that is
/// not safe to retry: a retry duplicates the message.
#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub receiver_id: i64,
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}
