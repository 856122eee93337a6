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

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod options;
pub mod render;
pub mod storage;

pub use options::{
    DeliveryOptions, PageContext, Position, RelayOptions, SessionOptions, StorageBackend,
    WidgetOptions,
};
pub use render::{EntryKind, RenderedEntry, Renderer};
pub use storage::{Storage, StorageError};

/// Reply text used when the webhook answers with an empty `response`.
pub const DEFAULT_REPLY: &str = "Thank you for your message!";

/// Apology rendered when nothing more specific is known about a failure.
pub const DEFAULT_APOLOGY: &str =
    "Sorry, I cannot process your request at the moment. Please try again later.";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
    Error,
}

/// One message exchanged in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Turn {
    pub sender: Sender,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    #[must_use]
    pub fn new(sender: Sender, message: impl Into<String>) -> Self {
        Self {
            sender,
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}
