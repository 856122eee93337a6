use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use webchat_core::{RenderedEntry, Renderer};

/// In-memory rendering surface.
#[derive(Debug, Default)]
pub struct TranscriptRenderer {
    entries: Mutex<Vec<RenderedEntry>>,
    typing: AtomicUsize,
}

impl TranscriptRenderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<RenderedEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of typing indicators currently shown.
    #[must_use]
    pub fn typing(&self) -> usize {
        self.typing.load(Ordering::SeqCst)
    }
}

impl Renderer for TranscriptRenderer {
    fn append(&self, entry: RenderedEntry) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry);
    }

    fn show_typing(&self) {
        self.typing.fetch_add(1, Ordering::SeqCst);
    }

    fn hide_typing(&self) {
        let _ = self
            .typing
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
    }
}
