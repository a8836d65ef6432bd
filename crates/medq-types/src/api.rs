use serde::{Deserialize, Serialize};

use crate::models::Message;

// -- Users --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub name: String,
    /// `false` when the name was already registered.
    pub created: bool,
}

// -- Messages --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub message_text: String,
    /// Client whose thread a doctor is replying to. Ignored for clients.
    #[serde(default)]
    pub recipient: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SendMessageResponse {
    pub id: i64,
}

/// Poll for messages the caller has not seen yet.
///
/// `after_id` resumes after the last message id the caller holds.
/// Without it, `last_message_id` is read as the number of messages already
/// received and that many leading rows are skipped.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdatesRequest {
    #[serde(default)]
    pub last_message_id: usize,
    #[serde(default)]
    pub after_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdatesResponse {
    pub new_messages: Vec<Message>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerResponse {
    pub answered: bool,
}
