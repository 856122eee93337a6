//! Failure classification and reply parsing.

use serde_json::Value;
use thiserror::Error;

use webchat_core::{DEFAULT_APOLOGY, DEFAULT_REPLY};

use crate::transport::{TransportError, TransportResponse};

const NETWORK_NOTICE: &str = "Network error: Unable to connect to the server. Please check your internet connection and try again.";
const TIMEOUT_NOTICE: &str =
    "Request timed out. The server took too long to respond. Please try again later.";
const SERVER_NOTICE: &str =
    "The server returned an error. Our team has been notified and is working on a fix.";
const CROSS_ORIGIN_NOTICE: &str =
    "Cross-origin request blocked. Our team has been notified of this issue.";
const INVALID_FORMAT_NOTICE: &str =
    "The server returned an invalid response format. Our team has been notified of this issue.";
const MISSING_FIELD_NOTICE: &str = "Error: The webhook response did not contain a \"response\" property. Expected format: { \"response\": \"message\" }";

/// Why a message could not be delivered through one candidate.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeliveryFailure {
    #[error("webhook URL is not provided")]
    NotConfigured,

    #[error("network error: {0}")]
    Network(String),

    #[error("timeout: {0}")]
    Timeout(String),

    #[error("cross-origin blocked: {0}")]
    CrossOriginBlocked(String),

    #[error("server error: {status} - {body}")]
    Server { status: u16, body: String },

    #[error("invalid JSON response from webhook: {body} ({error})")]
    InvalidResponseFormat { error: String, body: String },

    #[error("webhook response has no \"response\" property")]
    MissingResponseField,
}

impl DeliveryFailure {
    /// Short machine-friendly name, used in logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotConfigured => "not_configured",
            Self::Network(_) => "network",
            Self::Timeout(_) => "timeout",
            Self::CrossOriginBlocked(_) => "cross_origin",
            Self::Server { .. } => "server",
            Self::InvalidResponseFormat { .. } => "invalid_format",
            Self::MissingResponseField => "missing_field",
        }
    }

    /// The message shown to the user and recorded as an error turn.
    #[must_use]
    pub const fn notice(&self) -> &'static str {
        match self {
            Self::NotConfigured => DEFAULT_APOLOGY,
            Self::Network(_) => NETWORK_NOTICE,
            Self::Timeout(_) => TIMEOUT_NOTICE,
            Self::CrossOriginBlocked(_) => CROSS_ORIGIN_NOTICE,
            Self::Server { .. } => SERVER_NOTICE,
            Self::InvalidResponseFormat { .. } => INVALID_FORMAT_NOTICE,
            Self::MissingResponseField => MISSING_FIELD_NOTICE,
        }
    }
}

impl From<TransportError> for DeliveryFailure {
    fn from(e: TransportError) -> Self {
        match e {
            TransportError::Timeout(detail) => Self::Timeout(detail),
            TransportError::Network(detail) => Self::Network(detail),
            e @ TransportError::CrossOriginBlocked { .. } => Self::CrossOriginBlocked(e.to_string()),
        }
    }
}

/// A well-formed webhook reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Text to render and record as the bot turn.
    pub text: String,
    /// The parsed response body, kept for diagnostics.
    pub raw: Value,
}

/// Extract the reply text from a webhook response.
///
/// Expects a 2xx status and a JSON object with a `response` field. An empty
/// or null `response` becomes the default reply; other non-string values are
/// rendered as JSON text.
pub fn parse_reply(response: TransportResponse) -> Result<Reply, DeliveryFailure> {
    if !response.is_success() {
        return Err(DeliveryFailure::Server {
            status: response.status,
            body: response.body,
        });
    }

    let raw: Value = match serde_json::from_str(&response.body) {
        Ok(raw) => raw,
        Err(e) => {
            return Err(DeliveryFailure::InvalidResponseFormat {
                error: e.to_string(),
                body: response.body,
            });
        }
    };

    let text = match raw.get("response") {
        None => return Err(DeliveryFailure::MissingResponseField),
        Some(Value::Null) => DEFAULT_REPLY.to_string(),
        Some(Value::String(text)) if text.is_empty() => DEFAULT_REPLY.to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    };

    Ok(Reply { text, raw })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_text() {
        let reply = parse_reply(TransportResponse::new(200, r#"{"response":"hi","id":7}"#)).unwrap();
        assert_eq!(reply.text, "hi");
        assert_eq!(reply.raw["id"], 7);
    }

    #[test]
    fn empty_reply_uses_filler() {
        let reply = parse_reply(TransportResponse::new(200, r#"{"response":""}"#)).unwrap();
        assert_eq!(reply.text, DEFAULT_REPLY);

        let reply = parse_reply(TransportResponse::new(200, r#"{"response":null}"#)).unwrap();
        assert_eq!(reply.text, DEFAULT_REPLY);
    }

    #[test]
    fn non_string_reply_is_rendered_as_json() {
        let reply = parse_reply(TransportResponse::new(200, r#"{"response":42}"#)).unwrap();
        assert_eq!(reply.text, "42");
    }

    #[test]
    fn non_success_status_keeps_body() {
        let failure = parse_reply(TransportResponse::new(500, "upstream exploded")).unwrap_err();
        assert_eq!(
            failure,
            DeliveryFailure::Server {
                status: 500,
                body: "upstream exploded".to_string()
            }
        );
        assert_eq!(failure.notice(), SERVER_NOTICE);
    }

    #[test]
    fn invalid_json() {
        let failure = parse_reply(TransportResponse::new(200, "<html>ok</html>")).unwrap_err();
        match &failure {
            DeliveryFailure::InvalidResponseFormat { error, body } => {
                assert_eq!(body, "<html>ok</html>");
                assert!(!error.is_empty());
            }
            other => panic!("unexpected failure: {other:?}"),
        }
        assert!(failure.to_string().contains("<html>ok</html>"));
        assert_eq!(failure.notice(), INVALID_FORMAT_NOTICE);
    }

    #[test]
    fn missing_field() {
        let failure = parse_reply(TransportResponse::new(200, r#"{"reply":"hi"}"#)).unwrap_err();
        assert_eq!(failure, DeliveryFailure::MissingResponseField);
        assert!(failure.notice().contains("Expected format"));

        let failure = parse_reply(TransportResponse::new(200, r#"["hi"]"#)).unwrap_err();
        assert_eq!(failure, DeliveryFailure::MissingResponseField);
    }

    #[test]
    fn transport_errors_map_to_classes() {
        let timeout: DeliveryFailure = TransportError::Timeout("slow".to_string()).into();
        assert_eq!(timeout.notice(), TIMEOUT_NOTICE);

        let network: DeliveryFailure = TransportError::Network("refused".to_string()).into();
        assert_eq!(network.kind(), "network");
        assert_eq!(network.notice(), NETWORK_NOTICE);

        let blocked: DeliveryFailure = TransportError::CrossOriginBlocked {
            url: "https://hook".to_string(),
            origin: "https://site".to_string(),
        }
        .into();
        assert_eq!(blocked.notice(), CROSS_ORIGIN_NOTICE);
    }

    #[test]
    fn not_configured_uses_apology() {
        assert_eq!(DeliveryFailure::NotConfigured.notice(), DEFAULT_APOLOGY);
    }
}
