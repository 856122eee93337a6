use std::io::Write;
use tracing::debug;

use webchat_core::{EntryKind, RenderedEntry, Renderer};

/// Prints widget entries to the terminal.
///
/// The typing indicator goes to stderr and is erased in place when hidden.
#[derive(Debug, Clone)]
pub struct TerminalRenderer {
    title: String,
    echo_sent: bool,
}

impl TerminalRenderer {
    pub const fn new(title: String, echo_sent: bool) -> Self {
        Self { title, echo_sent }
    }
}

impl Renderer for TerminalRenderer {
    fn append(&self, entry: RenderedEntry) {
        match entry.kind {
            EntryKind::Sent if self.echo_sent => println!("> {}", entry.text),
            EntryKind::Sent => {}
            EntryKind::Received => println!("\n{}: {}\n", self.title, entry.text),
        }
    }

    fn show_typing(&self) {
        write_status(
            &mut std::io::stderr(),
            &format!("{} is typing...", self.title),
        );
    }

    fn hide_typing(&self) {
        write_status(&mut std::io::stderr(), "\r\x1b[2K");
    }
}

/// Write a transient status line. The indicator is cosmetic, so a failed
/// write is logged and otherwise ignored.
fn write_status<W: Write>(out: &mut W, text: &str) -> bool {
    match out.write_all(text.as_bytes()).and_then(|()| out.flush()) {
        Ok(()) => true,
        Err(e) => {
            debug!(error = %e, "Typing indicator not written");
            false
        }
    }
}
