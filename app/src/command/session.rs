use webchat_core::Sender;

use super::{GlobalArgs, build_session_store};

#[derive(Debug, Clone)]
pub struct SessionInput {
    pub global: GlobalArgs,
    pub reset: bool,
}

/// Shows or removes the stored session record.
#[derive(Debug, Clone, Copy)]
pub struct SessionStrategy;

impl super::CommandStrategy for SessionStrategy {
    type Input = SessionInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = input.global.load_config()?;
        let store = build_session_store(&config)?;

        if input.reset {
            store.reset().await;
            println!("Session removed.");
            return Ok(());
        }

        let Some(record) = store.current().await else {
            println!("No stored session.");
            return Ok(());
        };

        println!("=== Session {} ===\n", record.id);
        println!("Created:       {}", record.created.to_rfc3339());
        println!("Last activity: {}", record.last_activity.to_rfc3339());
        println!("Turns:         {}", record.conversation.len());
        println!();

        for turn in &record.conversation {
            let who = match turn.sender {
                Sender::User => "you",
                Sender::Bot => "bot",
                Sender::Error => "error",
            };
            println!(
                "[{}] {who}: {}",
                turn.timestamp.format("%Y-%m-%d %H:%M:%S"),
                turn.message
            );
        }

        Ok(())
    }
}
