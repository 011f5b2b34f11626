//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a chat conversation.
///
/// Wraps the chat id assigned by the transport. Every per-conversation
/// structure (context, guided flow, metrics flag) is keyed by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(i64);

impl ConversationId {
    /// Creates a ConversationId from a raw chat id.
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw chat id.
    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl From<i64> for ConversationId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ConversationId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_id_roundtrips_through_string() {
        let id = ConversationId::new(-100123);
        let parsed: ConversationId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!(parsed.as_i64(), -100123);
    }

    #[test]
    fn conversation_id_serializes_transparently() {
        let json = serde_json::to_string(&ConversationId::new(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn conversation_id_rejects_garbage() {
        assert!("not-a-number".parse::<ConversationId>().is_err());
    }
}
