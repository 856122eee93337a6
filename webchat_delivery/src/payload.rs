use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use webchat_core::{PageContext, Turn};
use webchat_session::{SessionHandle, SessionKind};

/// Request body posted to the webhook. Built fresh for every send.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OutboundPayload {
    pub message: String,
    pub timestamp: DateTime<Utc>,
    pub session: SessionDescriptor,
    pub conversation: ConversationContext,
    pub source: String,
    pub user_agent: String,
    pub page_title: String,
    pub referrer: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SessionDescriptor {
    pub id: String,
    pub is_new: bool,
    #[serde(rename = "type")]
    pub kind: SessionKind,
}

/// Turns recorded before the message being sent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConversationContext {
    pub history: Vec<Turn>,
    pub message_count: usize,
}

impl OutboundPayload {
    #[must_use]
    pub fn new(
        message: &str,
        session: &SessionHandle,
        history: Vec<Turn>,
        page: &PageContext,
    ) -> Self {
        Self {
            message: message.to_string(),
            timestamp: Utc::now(),
            session: SessionDescriptor {
                id: session.id.clone(),
                is_new: session.is_new,
                kind: session.kind,
            },
            conversation: ConversationContext {
                history,
                message_count: session.message_count,
            },
            source: page.source.clone(),
            user_agent: page.user_agent.clone(),
            page_title: page.title.clone(),
            referrer: page.referrer.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use webchat_core::Sender;

    #[test]
    fn wire_shape() {
        let session = SessionHandle {
            id: "temp_session_1_abc".to_string(),
            is_new: true,
            kind: SessionKind::Temporary,
            message_count: 1,
        };
        let history = vec![Turn::new(Sender::User, "earlier")];
        let payload = OutboundPayload::new("hello", &session, history, &PageContext::default());

        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["message"], "hello");
        assert_eq!(json["session"]["id"], "temp_session_1_abc");
        assert_eq!(json["session"]["isNew"], true);
        assert_eq!(json["session"]["type"], "temporary");
        assert_eq!(json["conversation"]["messageCount"], 1);
        assert_eq!(json["conversation"]["history"][0]["sender"], "user");
        assert_eq!(json["source"], "cli://webchat");
        assert_eq!(json["pageTitle"], "webchat");
        assert!(json["userAgent"].as_str().unwrap().starts_with("webchat/"));
        assert!(json["referrer"].is_null());
        assert!(json["timestamp"].is_string());
    }
}
