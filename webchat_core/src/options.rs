//! Construction-time options shared by the widget, the session store and the
//! delivery client.
//!
//! Every field carries a serde default so a partial configuration file only
//! needs to name what it changes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Position {
    #[default]
    BottomRight,
    BottomLeft,
}

/// Options recognised by the chat widget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WidgetOptions {
    #[serde(default)]
    pub position: Position,
    #[serde(default = "WidgetOptions::default_title")]
    pub title: String,
    #[serde(default = "WidgetOptions::default_placeholder")]
    pub placeholder: String,
    #[serde(default = "WidgetOptions::default_welcome_message")]
    pub welcome_message: String,
    /// Webhook receiving every message. Empty means delivery is not configured.
    #[serde(default)]
    pub destination_url: String,
    #[serde(default = "WidgetOptions::default_primary_color")]
    pub primary_color: String,
    #[serde(default = "WidgetOptions::default_secondary_color")]
    pub secondary_color: String,
}

impl WidgetOptions {
    fn default_title() -> String {
        "Assistant".to_string()
    }

    fn default_placeholder() -> String {
        "Type your message here...".to_string()
    }

    fn default_welcome_message() -> String {
        "Hi there! 👋 How can I help you today?".to_string()
    }

    fn default_primary_color() -> String {
        "#00b3b0".to_string()
    }

    fn default_secondary_color() -> String {
        "#1a3c6e".to_string()
    }

    /// The destination, if one is configured.
    #[must_use]
    pub fn destination(&self) -> Option<&str> {
        let url = self.destination_url.trim();
        (!url.is_empty()).then_some(url)
    }
}

impl Default for WidgetOptions {
    fn default() -> Self {
        Self {
            position: Position::default(),
            title: Self::default_title(),
            placeholder: Self::default_placeholder(),
            welcome_message: Self::default_welcome_message(),
            destination_url: String::new(),
            primary_color: Self::default_primary_color(),
            secondary_color: Self::default_secondary_color(),
        }
    }
}

/// An alternate transport path tried before the direct request.
///
/// The request URL is `prefix` followed by the url-encoded destination, so a
/// prefix normally ends in `?` or `?url=`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelayOptions {
    pub prefix: String,
    #[serde(default = "RelayOptions::default_headers")]
    pub headers: BTreeMap<String, String>,
}

impl RelayOptions {
    fn default_headers() -> BTreeMap<String, String> {
        BTreeMap::from([("X-Requested-With".to_string(), "XMLHttpRequest".to_string())])
    }

    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            headers: Self::default_headers(),
        }
    }
}

/// Describes the page hosting the widget; sent along with every message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PageContext {
    #[serde(default = "PageContext::default_source")]
    pub source: String,
    #[serde(default = "PageContext::default_user_agent")]
    pub user_agent: String,
    #[serde(default = "PageContext::default_title")]
    pub title: String,
    #[serde(default)]
    pub referrer: Option<String>,
}

impl PageContext {
    fn default_source() -> String {
        "cli://webchat".to_string()
    }

    fn default_user_agent() -> String {
        format!("webchat/{}", env!("CARGO_PKG_VERSION"))
    }

    fn default_title() -> String {
        "webchat".to_string()
    }
}

impl Default for PageContext {
    fn default() -> Self {
        Self {
            source: Self::default_source(),
            user_agent: Self::default_user_agent(),
            title: Self::default_title(),
            referrer: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryOptions {
    /// Relays tried in listed order before the direct request.
    #[serde(default)]
    pub relays: Vec<RelayOptions>,
    /// Headers sent only on the direct request, never through a relay.
    #[serde(default)]
    pub direct_headers: BTreeMap<String, String>,
    /// Per-request timeout in seconds; `None` leaves requests unbounded.
    #[serde(default = "DeliveryOptions::default_timeout_secs")]
    pub timeout_secs: Option<u64>,
    /// Origin announced to the destination when emulating cross-origin checks.
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub enforce_cors: bool,
    #[serde(default)]
    pub page: PageContext,
}

impl DeliveryOptions {
    #[allow(clippy::unnecessary_wraps)]
    const fn default_timeout_secs() -> Option<u64> {
        Some(30)
    }
}

impl Default for DeliveryOptions {
    fn default() -> Self {
        Self {
            relays: Vec::new(),
            direct_headers: BTreeMap::new(),
            timeout_secs: Self::default_timeout_secs(),
            origin: None,
            enforce_cors: false,
            page: PageContext::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Memory,
    Disabled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionOptions {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Directory for the file backend; defaults to `~/webchat/storage`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_dir: Option<PathBuf>,
    #[serde(default = "SessionOptions::default_key")]
    pub key: String,
    #[serde(default = "SessionOptions::default_id_prefix")]
    pub id_prefix: String,
    #[serde(default = "SessionOptions::default_temporary_prefix")]
    pub temporary_prefix: String,
    /// Reject stored records whose id lacks `id_prefix`.
    #[serde(default)]
    pub require_prefix: bool,
    #[serde(default = "SessionOptions::default_ttl_hours")]
    pub ttl_hours: u32,
    #[serde(default = "SessionOptions::default_max_turns")]
    pub max_turns: usize,
    #[serde(default = "SessionOptions::default_history_window")]
    pub history_window: usize,
}

impl SessionOptions {
    fn default_key() -> String {
        "webchat_session".to_string()
    }

    fn default_id_prefix() -> String {
        "session_".to_string()
    }

    fn default_temporary_prefix() -> String {
        "temp_session_".to_string()
    }

    const fn default_ttl_hours() -> u32 {
        24
    }

    const fn default_max_turns() -> usize {
        20
    }

    const fn default_history_window() -> usize {
        5
    }

    #[must_use]
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.ttl_hours))
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            storage_dir: None,
            key: Self::default_key(),
            id_prefix: Self::default_id_prefix(),
            temporary_prefix: Self::default_temporary_prefix(),
            require_prefix: false,
            ttl_hours: Self::default_ttl_hours(),
            max_turns: Self::default_max_turns(),
            history_window: Self::default_history_window(),
        }
    }
}
