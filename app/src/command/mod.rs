//! Static strategy pattern for CLI commands.
//!
//! Each command is its own strategy type with its own input, dispatched
//! statically from `main`.

use std::fmt::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use webchat_config::Config;
use webchat_core::{Storage, StorageBackend};
use webchat_delivery::{Delivery, DeliveryFailure};
use webchat_session::{DisabledStorage, FileStorage, MemoryStorage, SessionStore};
use webchat_widget::ChatWidget;

use crate::terminal::TerminalRenderer;

mod chat;
mod info;
mod init;
mod send;
mod session;
mod version;

pub use chat::ChatStrategy;
pub use info::InfoStrategy;
pub use init::InitStrategy;
pub use send::{SendInput, SendStrategy};
pub use session::{SessionInput, SessionStrategy};
pub use version::VersionStrategy;

/// Flags shared by every command.
#[derive(Debug, Clone, Default)]
pub struct GlobalArgs {
    pub config: Option<PathBuf>,
    pub destination: Option<String>,
}

impl GlobalArgs {
    /// Load the config file and apply flag overrides.
    pub fn load_config(&self) -> anyhow::Result<Config> {
        let mut config = Config::load(self.config.as_deref())?;
        if let Some(destination) = &self.destination {
            config.widget.destination_url.clone_from(destination);
        }
        Ok(config)
    }
}

/// Core trait defining the contract for all command strategies.
///
/// Each strategy defines its own input type, so adding a command means
/// adding a type and implementing this trait.
pub trait CommandStrategy: Send + Sync + 'static {
    type Input;

    /// # Errors
    /// Returns an error if command execution fails.
    async fn execute(&self, input: Self::Input) -> anyhow::Result<()>;
}

/// Build the storage backend named by `session.backend`.
fn build_storage(config: &Config) -> anyhow::Result<Arc<dyn Storage>> {
    let storage: Arc<dyn Storage> = match config.session.backend {
        StorageBackend::File => {
            let storage = FileStorage::new(config.storage_dir()?);
            info!("Session storage: {}", storage.base_dir().display());
            Arc::new(storage)
        }
        StorageBackend::Memory => Arc::new(MemoryStorage::new()),
        StorageBackend::Disabled => Arc::new(DisabledStorage),
    };
    Ok(storage)
}

fn build_session_store(config: &Config) -> anyhow::Result<SessionStore> {
    Ok(SessionStore::new(
        build_storage(config)?,
        config.session.clone(),
    ))
}

/// Wire config, storage and transport into a terminal-rendered widget.
fn build_widget(
    config: &Config,
    echo_sent: bool,
) -> anyhow::Result<ChatWidget<webchat_delivery::HttpTransport, TerminalRenderer>> {
    let sessions = build_session_store(config)?;
    let renderer = TerminalRenderer::new(config.widget.title.clone(), echo_sent);
    ChatWidget::with_http(
        config.widget.clone(),
        config.delivery.clone(),
        sessions,
        renderer,
    )
}

/// Dump what the webhook actually returned, for `send --debug` and `/last`.
fn print_diagnostics(delivery: &Delivery) {
    eprint!("{}", diagnostics(delivery));
}

fn diagnostics(delivery: &Delivery) -> String {
    let mut out = format!("--- last response ({:?}) ---\n", delivery.state());
    for attempt in delivery.failed_attempts() {
        let _ = writeln!(out, "attempt {} failed: {attempt}", attempt.candidate + 1);
    }
    let _ = match delivery {
        Delivery::Delivered { raw, candidate, .. } => {
            writeln!(out, "delivered by candidate {}:\n{raw:#}", candidate + 1)
        }
        Delivery::Failed {
            failure: DeliveryFailure::InvalidResponseFormat { body, .. },
            ..
        } => writeln!(out, "raw body:\n{body}"),
        Delivery::Failed { failure, .. } => writeln!(out, "failure: {failure}"),
        Delivery::Cancelled { .. } => writeln!(out, "cancelled before a reply arrived"),
    };
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use webchat_delivery::FailedAttempt;

    #[test]
    fn diagnostics_show_unparseable_body() {
        let failure = DeliveryFailure::InvalidResponseFormat {
            error: "expected value at line 1 column 1".to_string(),
            body: "<html>Gateway login</html>".to_string(),
        };
        let delivery = Delivery::Failed {
            notice: failure.notice().to_string(),
            failed: vec![FailedAttempt {
                candidate: 0,
                url: "https://hooks.example/chat".to_string(),
                failure: failure.clone(),
            }],
            failure,
        };

        let text = diagnostics(&delivery);

        assert!(text.contains("attempt 1 failed: https://hooks.example/chat"));
        assert!(text.contains("raw body:\n<html>Gateway login</html>"));
    }

    #[test]
    fn diagnostics_pretty_print_reply() {
        let delivery = Delivery::Delivered {
            reply: "hi".to_string(),
            raw: serde_json::json!({ "response": "hi", "trace": "abc" }),
            candidate: 0,
            failed: Vec::new(),
        };

        let text = diagnostics(&delivery);

        assert!(text.contains("delivered by candidate 1:"));
        assert!(text.contains("\"trace\": \"abc\""));
    }
}
