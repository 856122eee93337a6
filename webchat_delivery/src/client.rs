//! The per-message send flow.
//!
//! `DeliveryClient` owns the session store: it records the user turn, builds
//! the payload from the session and its recent history, walks the candidate
//! chain and records exactly one outcome turn (bot reply or error notice).

use serde_json::Value;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use webchat_core::{DeliveryOptions, Sender};
use webchat_session::SessionStore;

use crate::candidate::candidates;
use crate::chain::{ChainOutcome, first_success};
use crate::failure::{DeliveryFailure, parse_reply};
use crate::payload::OutboundPayload;
use crate::transport::{HttpTransport, Transport};

/// Where a single message is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendState {
    Idle,
    Composing,
    Sending { candidate: usize },
    Delivered,
    Failed,
    Cancelled,
}

impl SendState {
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Delivered | Self::Failed | Self::Cancelled)
    }
}

/// A candidate that did not produce a reply.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{url}: {failure}")]
pub struct FailedAttempt {
    pub candidate: usize,
    pub url: String,
    pub failure: DeliveryFailure,
}

/// Terminal result of one send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Delivered {
        reply: String,
        /// Parsed response body as the webhook sent it.
        raw: Value,
        candidate: usize,
        failed: Vec<FailedAttempt>,
    },
    Failed {
        failure: DeliveryFailure,
        notice: String,
        failed: Vec<FailedAttempt>,
    },
    Cancelled {
        failed: Vec<FailedAttempt>,
    },
}

impl Delivery {
    #[must_use]
    pub const fn state(&self) -> SendState {
        match self {
            Self::Delivered { .. } => SendState::Delivered,
            Self::Failed { .. } => SendState::Failed,
            Self::Cancelled { .. } => SendState::Cancelled,
        }
    }

    /// Text to show the user, if this outcome renders anything.
    #[must_use]
    pub fn rendered_text(&self) -> Option<&str> {
        match self {
            Self::Delivered { reply, .. } => Some(reply.as_str()),
            Self::Failed { notice, .. } => Some(notice.as_str()),
            Self::Cancelled { .. } => None,
        }
    }

    /// The parsed webhook response behind a delivered reply.
    #[must_use]
    pub const fn raw_response(&self) -> Option<&Value> {
        match self {
            Self::Delivered { raw, .. } => Some(raw),
            Self::Failed { .. } | Self::Cancelled { .. } => None,
        }
    }

    #[must_use]
    pub fn failed_attempts(&self) -> &[FailedAttempt] {
        match self {
            Self::Delivered { failed, .. } | Self::Failed { failed, .. } | Self::Cancelled { failed } => {
                failed
            }
        }
    }
}

pub struct DeliveryClient<T = HttpTransport> {
    transport: T,
    sessions: SessionStore,
    destination: Option<String>,
    options: DeliveryOptions,
}

impl<T: Transport> DeliveryClient<T> {
    #[must_use]
    pub fn new(
        transport: T,
        sessions: SessionStore,
        destination: Option<String>,
        options: DeliveryOptions,
    ) -> Self {
        Self {
            transport,
            sessions,
            destination: destination.filter(|d| !d.trim().is_empty()),
            options,
        }
    }

    #[must_use]
    pub const fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    #[must_use]
    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    #[must_use]
    pub const fn options(&self) -> &DeliveryOptions {
        &self.options
    }

    /// Send one message. Returns `None` when the trimmed input is empty, in
    /// which case nothing is recorded and nothing is sent.
    pub async fn send(&self, input: &str) -> Option<Delivery> {
        self.send_with_cancel(input, &CancellationToken::new()).await
    }

    /// Like [`send`](Self::send), abandoning the remaining chain once
    /// `cancel` fires. A cancelled send records no outcome turn.
    pub async fn send_with_cancel(
        &self,
        input: &str,
        cancel: &CancellationToken,
    ) -> Option<Delivery> {
        let message = input.trim();
        if message.is_empty() {
            debug!(state = ?SendState::Idle, "Ignoring empty message");
            return None;
        }
        debug!(state = ?SendState::Composing, "Composing message");

        let session = self.sessions.get_or_create_session().await;
        let history = self
            .sessions
            .recent_history(self.sessions.options().history_window)
            .await;
        self.sessions.append_turn(Sender::User, message).await;
        info!(session_id = %session.id, kind = ?session.kind, "Sending message");

        let delivery = match self.destination.as_deref() {
            Some(destination) => {
                let payload = OutboundPayload::new(message, &session, history, &self.options.page);
                self.deliver(destination, &payload, cancel).await
            }
            None => {
                error!("Webhook URL is not provided");
                let failure = DeliveryFailure::NotConfigured;
                Delivery::Failed {
                    notice: failure.notice().to_string(),
                    failure,
                    failed: Vec::new(),
                }
            }
        };

        match &delivery {
            Delivery::Delivered { reply, .. } => {
                self.sessions.append_turn(Sender::Bot, reply).await;
            }
            Delivery::Failed { notice, .. } => {
                self.sessions.append_turn(Sender::Error, notice).await;
            }
            Delivery::Cancelled { .. } => {}
        }
        debug!(state = ?delivery.state(), "Send finished");

        Some(delivery)
    }

    /// Walk the candidate chain for an already-built payload.
    ///
    /// Does not touch the session store.
    pub async fn deliver(
        &self,
        destination: &str,
        payload: &OutboundPayload,
        cancel: &CancellationToken,
    ) -> Delivery {
        let chain = candidates(&self.options);
        let total = chain.len();
        let transport = &self.transport;

        let outcome = first_success(&chain, cancel, |index, candidate| {
            let request = candidate.request(destination, &self.options);
            let state = SendState::Sending { candidate: index };
            debug!(
                state = ?state,
                url = %request.url,
                "Posting to candidate {}/{total}",
                index + 1
            );
            async move {
                let result = transport
                    .post(&request, payload)
                    .await
                    .map_err(DeliveryFailure::from)
                    .and_then(parse_reply);
                result.map_err(|failure| FailedAttempt {
                    candidate: index,
                    url: request.url,
                    failure,
                })
            }
        })
        .await;

        match outcome {
            ChainOutcome::Success {
                value,
                index,
                failures,
            } => {
                info!(candidate = index + 1, total, "Message delivered");
                Delivery::Delivered {
                    reply: value.text,
                    raw: value.raw,
                    candidate: index,
                    failed: failures,
                }
            }
            ChainOutcome::Exhausted { failures } => {
                let failure = failures.last().map_or_else(
                    || DeliveryFailure::Network("no transport candidates".to_string()),
                    |attempt| attempt.failure.clone(),
                );
                warn!(kind = failure.kind(), error = %failure, "All request methods failed");
                Delivery::Failed {
                    notice: failure.notice().to_string(),
                    failure,
                    failed: failures,
                }
            }
            ChainOutcome::Cancelled { failures } => {
                info!(attempted = failures.len(), "Send cancelled");
                Delivery::Cancelled { failed: failures }
            }
        }
    }
}
