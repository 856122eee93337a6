use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use webchat_core::{DeliveryOptions, SessionOptions, StorageBackend, WidgetOptions};

const CONFIG_DIR: &str = "webchat";
const CONFIG_FILE: &str = "config.json";
const STORAGE_DIR: &str = "storage";

#[derive(Debug, Default, Deserialize, Serialize, Clone)]
pub struct Config {
    #[serde(default)]
    pub widget: WidgetOptions,
    #[serde(default)]
    pub delivery: DeliveryOptions,
    #[serde(default)]
    pub session: SessionOptions,
}

impl Config {
    /// Load from `path`, or from `~/webchat/config.json` when none is given.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::config_dir()?.join(CONFIG_FILE),
        };

        if !config_path.exists() {
            anyhow::bail!(
                "Config file not found at: {}. Please run 'webchat init' to create config.",
                config_path.display()
            );
        }

        let content = std::fs::read_to_string(&config_path)?;
        let config = Self::from_json(&content)?;
        debug!(path = %config_path.display(), "Loaded config");

        Ok(config)
    }

    pub fn from_json(content: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn config_dir() -> anyhow::Result<PathBuf> {
        Ok(dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Cannot find home directory"))?
            .join(CONFIG_DIR))
    }

    pub fn ensure_config_dir() -> anyhow::Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    /// Directory the file backend keeps session records in.
    ///
    /// `session.storage_dir` wins; otherwise the path sits next to the
    /// config file.
    pub fn storage_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.session.storage_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::config_dir()?.join(STORAGE_DIR)),
        }
    }

    /// Write the starter config. Refuses to overwrite an existing file.
    pub fn create_config(path: Option<&Path>) -> anyhow::Result<PathBuf> {
        let config_path = match path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                path.to_path_buf()
            }
            None => Self::ensure_config_dir()?.join(CONFIG_FILE),
        };

        if config_path.exists() {
            anyhow::bail!(
                "Config file already exists at: {}. Please edit it directly.",
                config_path.display()
            );
        }

        std::fs::write(&config_path, CONFIG_TEMPLATE)?;
        Ok(config_path)
    }

    #[must_use]
    pub fn uses_file_storage(&self) -> bool {
        self.session.backend == StorageBackend::File
    }
}

const CONFIG_TEMPLATE: &str = r##"{
  "widget": {
    "position": "bottom-right",
    "title": "Assistant",
    "placeholder": "Type your message here...",
    "welcome_message": "Hi there! 👋 How can I help you today?",
    "destination_url": "https://your-webhook.example/chat",
    "primary_color": "#00b3b0",
    "secondary_color": "#1a3c6e"
  },
  "delivery": {
    "relays": [],
    "direct_headers": {},
    "timeout_secs": 30,
    "enforce_cors": false
  },
  "session": {
    "backend": "file",
    "ttl_hours": 24,
    "max_turns": 20,
    "history_window": 5
  }
}"##;
