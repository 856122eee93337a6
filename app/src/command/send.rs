use webchat_delivery::SendState;

use super::{GlobalArgs, build_widget, print_diagnostics};

#[derive(Debug, Clone)]
pub struct SendInput {
    pub global: GlobalArgs,
    pub message: String,
    pub debug: bool,
}

/// Sends one message and exits non-zero when delivery fails.
#[derive(Debug, Clone, Copy)]
pub struct SendStrategy;

impl super::CommandStrategy for SendStrategy {
    type Input = SendInput;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let mut config = input.global.load_config()?;
        config.widget.welcome_message.clear();
        let widget = build_widget(&config, true)?;

        let state = widget.submit(&input.message).await;
        if input.debug {
            if let Some(delivery) = widget.last_delivery() {
                print_diagnostics(&delivery);
            }
        }

        match state {
            SendState::Delivered => Ok(()),
            SendState::Idle => anyhow::bail!("Message is empty"),
            state => anyhow::bail!("Message was not delivered ({state:?})"),
        }
    }
}
