use serde::{Deserialize, Serialize};

use crate::host::web::DEFAULT_BASE_URL;
use crate::menu::MAX_QUEUE_ITEMS;

/// User-editable configuration, read once at startup
/// stored in `config.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserConfig {
    #[serde(default = "default_menu_label")]
    pub menu_label: String,
    #[serde(default = "default_max_queue_items")]
    pub max_queue_items: usize,
    #[serde(default)]
    pub readiness: ReadinessConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub log: LogConfig,
}

fn default_menu_label() -> String {
    "Add to Queue After...".to_string()
}

fn default_max_queue_items() -> usize {
    MAX_QUEUE_ITEMS
}

impl Default for UserConfig {
    fn default() -> Self {
        Self {
            menu_label: default_menu_label(),
            max_queue_items: default_max_queue_items(),
            readiness: ReadinessConfig::default(),
            web: WebConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl UserConfig {
    /// Number of submenu rows, never above what the player can show.
    pub fn slot_count(&self) -> usize {
        self.max_queue_items.min(MAX_QUEUE_ITEMS)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadinessConfig {
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Unset means wait for the host forever
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

fn default_poll_interval_ms() -> u64 {
    100
}

impl Default for ReadinessConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            timeout_ms: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default)]
    pub access_token: Option<String>,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_token: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogConfig {
    #[serde(default = "default_level")]
    pub level: String,
    /// Also write to `queue-after.log` in the config directory
    #[serde(default = "default_log_file")]
    pub file: bool,
}

fn default_level() -> String {
    "info".to_string()
}

fn default_log_file() -> bool {
    true
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: default_log_file(),
        }
    }
}
