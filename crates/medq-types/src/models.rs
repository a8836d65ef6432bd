use serde::{Deserialize, Serialize};

/// Hard upper bound on `Message::message_text`, counted in characters.
pub const MAX_MESSAGE_CHARS: usize = 1000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    #[default]
    Client,
    Doctor,
}

impl UserRole {
    /// Name stored in the `users.role` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Client => "Client",
            Self::Doctor => "Doctor",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Client" => Some(Self::Client),
            "Doctor" => Some(Self::Doctor),
            _ => None,
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub name: String,
    /// Opaque to the store; produced and checked by whoever registers users.
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub role: UserRole,
}

/// Lifecycle of a message.
///
/// `Queue`: added but not reviewed yet.
/// `Answered`: reviewed and answered by a doctor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageStatus {
    Queue,
    Answered,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Queue => "Queue",
            Self::Answered => "Answered",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Queue" => Some(Self::Queue),
            "Answered" => Some(Self::Answered),
            _ => None,
        }
    }

    /// Queue -> Answered is the only forward move; staying put is allowed.
    pub fn can_transition_to(&self, next: MessageStatus) -> bool {
        matches!(
            (self, next),
            (Self::Queue, _) | (Self::Answered, Self::Answered)
        )
    }
}

impl std::fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A message in a client's thread.
///
/// `author_name` names the client who owns the thread. Doctor replies are
/// filed under the client they answer, with `is_doc` set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    pub author_name: String,
    pub message_text: String,
    pub status: MessageStatus,
    /// Ingestion time, `YYYY-MM-DD, HH:MM`.
    pub sent_date: String,
    pub is_doc: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_defaults_to_client() {
        assert_eq!(UserRole::default(), UserRole::Client);
    }

    #[test]
    fn role_names_match_column_values() {
        assert_eq!(UserRole::from_name("Doctor"), Some(UserRole::Doctor));
        assert_eq!(UserRole::from_name(UserRole::Client.as_str()), Some(UserRole::Client));
        assert_eq!(UserRole::from_name("doctor"), None);
    }

    #[test]
    fn answered_never_goes_back_to_queue() {
        assert!(MessageStatus::Queue.can_transition_to(MessageStatus::Answered));
        assert!(MessageStatus::Queue.can_transition_to(MessageStatus::Queue));
        assert!(MessageStatus::Answered.can_transition_to(MessageStatus::Answered));
        assert!(!MessageStatus::Answered.can_transition_to(MessageStatus::Queue));
    }

    #[test]
    fn user_serialization_hides_password_hash() {
        let user = User {
            name: "alice".into(),
            hashed_password: "$argon2id$secret".into(),
            role: UserRole::Client,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(json.contains("\"role\":\"Client\""));
    }
}
