#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! Delivery of chat messages to a single webhook.
//!
//! A message is posted to an ordered list of transport candidates (configured
//! relays first, then the destination itself) until one of them yields a
//! well-formed reply. Failures are classified so the widget can show the user
//! a specific explanation.

mod candidate;
mod chain;
mod client;
mod failure;
mod payload;
mod transport;

pub use candidate::{Candidate, candidates, relay_url};
pub use chain::{ChainOutcome, first_success};
pub use client::{Delivery, DeliveryClient, FailedAttempt, SendState};
pub use failure::{DeliveryFailure, Reply, parse_reply};
pub use payload::{ConversationContext, OutboundPayload, SessionDescriptor};
pub use transport::{
    HttpTransport, Transport, TransportError, TransportRequest, TransportResponse,
};
