//! Interactive chat against the configured webhook.
//!
//! Ctrl-C while a message is in flight cancels that send; at the prompt it
//! ends the session.

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_util::sync::CancellationToken;
use tracing::info;

use webchat_delivery::SendState;

use super::{GlobalArgs, build_widget, print_diagnostics};

#[derive(Debug, Clone, Copy)]
pub struct ChatStrategy;

impl super::CommandStrategy for ChatStrategy {
    type Input = GlobalArgs;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = input.load_config()?;
        let widget = build_widget(&config, false)?;

        match widget.client().destination() {
            Some(destination) => info!("Delivering to {destination}"),
            None => info!("No destination configured"),
        }

        println!("=== {} ===", widget.options().title);
        println!("Type 'exit', 'quit', or Ctrl+C to end the session.");
        println!("Type '/last' to show the last webhook response.\n");

        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut sent = 0_usize;

        loop {
            let line = tokio::select! {
                line = lines.next_line() => line?,
                _ = tokio::signal::ctrl_c() => None,
            };
            let Some(line) = line else {
                break;
            };
            let line = line.trim();

            if matches!(line, "exit" | "quit" | "q") {
                break;
            }
            if line.is_empty() {
                continue;
            }
            if line == "/last" {
                match widget.last_delivery() {
                    Some(delivery) => print_diagnostics(&delivery),
                    None => eprintln!("No response yet."),
                }
                continue;
            }

            let cancel = CancellationToken::new();
            let watcher = {
                let cancel = cancel.clone();
                tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        cancel.cancel();
                    }
                })
            };

            let state = widget.submit_with_cancel(line, &cancel).await;
            watcher.abort();

            match state {
                SendState::Cancelled => println!("(cancelled)\n"),
                SendState::Delivered | SendState::Failed => sent += 1,
                _ => {}
            }
        }

        println!("\nSession ended. Messages sent: {sent}");
        Ok(())
    }
}
