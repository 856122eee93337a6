use super::GlobalArgs;

/// Prints the effective configuration, with header values masked.
#[derive(Debug, Clone, Copy)]
pub struct InfoStrategy;

impl super::CommandStrategy for InfoStrategy {
    type Input = GlobalArgs;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = input.load_config()?;

        println!("=== webchat Configuration ===\n");

        println!("Widget:");
        println!("  Title: {}", config.widget.title);
        println!("  Position: {:?}", config.widget.position);
        println!(
            "  Destination: {}",
            config.widget.destination().unwrap_or("(not set)")
        );
        println!(
            "  Welcome Message: {}",
            truncate(&config.widget.welcome_message, 60)
        );
        println!();

        println!("Delivery:");
        if config.delivery.relays.is_empty() {
            println!("  Relays: (none)");
        } else {
            println!("  Relays:");
            for (i, relay) in config.delivery.relays.iter().enumerate() {
                println!("    {}. {}", i + 1, relay.prefix);
            }
        }
        for (name, value) in &config.delivery.direct_headers {
            println!("  Direct Header: {name}: {}", mask(value));
        }
        match config.delivery.timeout_secs {
            Some(secs) => println!("  Timeout: {secs}s"),
            None => println!("  Timeout: (none)"),
        }
        if let Some(origin) = &config.delivery.origin {
            println!("  Origin: {origin}");
            println!("  Enforce CORS: {}", config.delivery.enforce_cors);
        }
        println!();

        println!("Session:");
        println!("  Backend: {:?}", config.session.backend);
        if config.uses_file_storage() {
            println!("  Storage Dir: {}", config.storage_dir()?.display());
        }
        println!("  Key: {}", config.session.key);
        println!("  TTL: {}h", config.session.ttl_hours);
        println!("  Max Turns: {}", config.session.max_turns);
        println!("  History Window: {}", config.session.history_window);

        Ok(())
    }
}

fn mask(value: &str) -> String {
    let chars: Vec<char> = value.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        format!("{head}...***")
    } else {
        "***".to_string()
    }
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let head: String = s.chars().take(max_chars - 3).collect();
        format!("{head}...")
    }
}
