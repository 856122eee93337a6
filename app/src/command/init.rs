use webchat_config::Config;

use super::GlobalArgs;

/// Creates the starter configuration file.
#[derive(Debug, Clone, Copy)]
pub struct InitStrategy;

impl super::CommandStrategy for InitStrategy {
    type Input = GlobalArgs;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let path = Config::create_config(input.config.as_deref())?;

        println!("Created config file at: {}", path.display());
        println!();
        println!("Next steps:");
        println!("   1. Set widget.destination_url to your webhook");
        println!("   2. Optionally list relays under delivery.relays");
        println!("   3. Run 'webchat chat' to start a conversation");
        Ok(())
    }
}
