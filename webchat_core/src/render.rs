use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Sent,
    Received,
}

/// One entry in the rendered message log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RenderedEntry {
    pub kind: EntryKind,
    pub text: String,
}

impl RenderedEntry {
    #[must_use]
    pub fn sent(text: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::Sent,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn received(text: impl Into<String>) -> Self {
        Self {
            kind: EntryKind::Received,
            text: text.into(),
        }
    }
}

/// Rendering surface fed by the widget.
///
/// Entries are append-only and arrive in completion order. The typing
/// indicator is shown once per in-flight send and hidden once per terminal
/// state, so overlapping sends show and hide it in pairs.
pub trait Renderer: Send + Sync {
    fn append(&self, entry: RenderedEntry);
    fn show_typing(&self);
    fn hide_typing(&self);
}

impl<R: Renderer + ?Sized> Renderer for std::sync::Arc<R> {
    fn append(&self, entry: RenderedEntry) {
        (**self).append(entry);
    }

    fn show_typing(&self) {
        (**self).show_typing();
    }

    fn hide_typing(&self) {
        (**self).hide_typing();
    }
}
