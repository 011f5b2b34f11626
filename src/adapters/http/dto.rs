//! Request types for the HTTP endpoint.

use serde::Deserialize;

/// Query string of `GET /ask`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AskQuery {
    pub question: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn question_is_optional() {
        let query: AskQuery = serde_json::from_str("{}").unwrap();
        assert!(query.question.is_none());

        let query: AskQuery = serde_json::from_str(r#"{"question": "hi"}"#).unwrap();
        assert_eq!(query.question.as_deref(), Some("hi"));
    }
}
