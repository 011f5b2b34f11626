//! Telegram Bot API wire types.
//!
//! Only the fields the bot reads or writes are modelled; unknown fields are
//! ignored on deserialization.

use serde::{Deserialize, Serialize};

/// Envelope wrapping every Bot API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub error_code: Option<i64>,
    pub description: Option<String>,
}

/// One entry returned by `getUpdates`.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Serialize)]
pub struct GetUpdatesRequest {
    pub offset: i64,
    pub timeout: u64,
    pub allowed_updates: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct SendMessageRequest<'a> {
    pub chat_id: i64,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct SendChatActionRequest {
    pub chat_id: i64,
    pub action: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_with_text_message_deserializes() {
        let json = r#"{
            "ok": true,
            "result": [{
                "update_id": 1001,
                "message": {
                    "message_id": 5,
                    "from": {"id": 42, "is_bot": false, "first_name": "A"},
                    "chat": {"id": 42, "type": "private"},
                    "date": 1700000000,
                    "text": "/findTrack"
                }
            }]
        }"#;

        let response: ApiResponse<Vec<Update>> = serde_json::from_str(json).unwrap();

        assert!(response.ok);
        let updates = response.result.unwrap();
        assert_eq!(updates[0].update_id, 1001);
        let message = updates[0].message.as_ref().unwrap();
        assert_eq!(message.chat.id, 42);
        assert_eq!(message.text.as_deref(), Some("/findTrack"));
    }

    #[test]
    fn error_response_deserializes() {
        let json = r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#;

        let response: ApiResponse<Vec<Update>> = serde_json::from_str(json).unwrap();

        assert!(!response.ok);
        assert_eq!(response.error_code, Some(401));
        assert_eq!(response.description.as_deref(), Some("Unauthorized"));
    }

    #[test]
    fn send_message_omits_parse_mode_for_plain_text() {
        let request = SendMessageRequest {
            chat_id: 1,
            text: "hi",
            parse_mode: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("parse_mode").is_none());
    }
}
