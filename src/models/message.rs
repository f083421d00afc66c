use serde::{Deserialize, Serialize};
use std::fmt;

use super::ConversationId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One turn of a conversation. Never edited once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            created_at: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            created_at: None,
        }
    }
}

/// Body of `POST /chat/send`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendMessage {
    pub conversation_id: ConversationId,
    pub message: String,
}

/// Response of `POST /chat/send`. `reply` may be missing or null.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendReply {
    #[serde(default)]
    pub reply: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_uses_lowercase_wire_names() {
        let msg: Message = serde_json::from_str(r#"{"role": "assistant", "content": "hi"}"#).unwrap();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(serde_json::to_value(Role::User).unwrap(), serde_json::json!("user"));
    }

    #[test]
    fn test_unknown_role_is_rejected() {
        let result = serde_json::from_str::<Message>(r#"{"role": "system", "content": "x"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_send_reply_tolerates_missing_and_null() {
        let missing: SendReply = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.reply, None);
        let null: SendReply = serde_json::from_str(r#"{"reply": null}"#).unwrap();
        assert_eq!(null.reply, None);
    }

    #[test]
    fn test_send_body_shape() {
        let body = SendMessage {
            conversation_id: ConversationId::Int(4),
            message: "hello".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"conversation_id": 4, "message": "hello"})
        );
    }
}
