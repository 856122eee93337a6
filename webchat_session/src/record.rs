//! The persisted session record and the handle handed to callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use webchat_core::Turn;

/// Session state as it is written to storage.
///
/// Timestamps are stored as epoch milliseconds. There is no schema version:
/// anything that fails to parse is treated as absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    pub id: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created: DateTime<Utc>,
    #[serde(default = "Utc::now", with = "chrono::serde::ts_milliseconds")]
    pub last_activity: DateTime<Utc>,
    #[serde(default)]
    pub conversation: Vec<Turn>,
}

impl SessionRecord {
    #[must_use]
    pub const fn new(id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            created: now,
            last_activity: now,
            conversation: Vec::new(),
        }
    }

    /// Append a turn and drop the oldest entries beyond `max_turns`.
    pub fn push_turn(&mut self, turn: Turn, max_turns: usize) {
        self.last_activity = turn.timestamp;
        self.conversation.push(turn);
        let overflow = self.conversation.len().saturating_sub(max_turns);
        if overflow > 0 {
            self.conversation.drain(..overflow);
        }
    }

    /// The last `n` turns, oldest first.
    #[must_use]
    pub fn last_n_turns(&self, n: usize) -> &[Turn] {
        let start = self.conversation.len().saturating_sub(n);
        &self.conversation[start..]
    }

    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now.signed_duration_since(self.created)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SessionKind {
    /// Never written to storage; does not survive a restart.
    Temporary,
    Persistent,
}

/// What callers learn about the active session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    pub id: String,
    /// Set when the record was created by this call.
    pub is_new: bool,
    pub kind: SessionKind,
    /// Turns stored in the record at the time of the call.
    pub message_count: usize,
}

impl SessionHandle {
    #[must_use]
    pub const fn is_temporary(&self) -> bool {
        matches!(self.kind, SessionKind::Temporary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webchat_core::Sender;

    #[test]
    fn push_turn_keeps_most_recent() {
        let mut record = SessionRecord::new("session_1".to_string(), Utc::now());
        for i in 0..5 {
            record.push_turn(Turn::new(Sender::User, format!("m{i}")), 3);
        }

        let messages: Vec<_> = record.conversation.iter().map(|t| t.message.as_str()).collect();
        assert_eq!(messages, ["m2", "m3", "m4"]);
    }

    #[test]
    fn last_n_turns_clamps() {
        let mut record = SessionRecord::new("session_1".to_string(), Utc::now());
        record.push_turn(Turn::new(Sender::User, "a"), 20);
        record.push_turn(Turn::new(Sender::Bot, "b"), 20);

        assert_eq!(record.last_n_turns(5).len(), 2);
        assert_eq!(record.last_n_turns(1)[0].message, "b");
        assert!(record.last_n_turns(0).is_empty());
    }

    #[test]
    fn reads_record_without_conversation() {
        let record: SessionRecord = serde_json::from_str(
            r#"{"id":"session_1714557600000_abc123def","created":1714557600000,"lastActivity":1714557600000}"#,
        )
        .unwrap();
        assert!(record.conversation.is_empty());
        assert_eq!(record.created.timestamp_millis(), 1_714_557_600_000);
    }

    #[test]
    fn writes_camel_case_millis() {
        let now = DateTime::from_timestamp_millis(1_714_557_600_000).unwrap();
        let record = SessionRecord::new("session_x".to_string(), now);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["created"], 1_714_557_600_000_i64);
        assert_eq!(json["lastActivity"], 1_714_557_600_000_i64);
        assert!(json["conversation"].as_array().unwrap().is_empty());
    }
}
