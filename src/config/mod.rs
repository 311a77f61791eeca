use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

pub mod user;

pub use user::{LogConfig, ReadinessConfig, UserConfig, WebConfig};

pub struct AppConfig;

impl AppConfig {
    pub fn get_config_dir() -> PathBuf {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        let xdg_dir = home.join(".config").join("queue-after");

        // Ensure it exists
        if !xdg_dir.exists() {
            let _ = fs::create_dir_all(&xdg_dir);
        }

        xdg_dir
    }

    pub fn get_config_path() -> PathBuf {
        Self::get_config_dir().join("config.toml")
    }

    /// Load `config.toml`, writing the defaults out on first run.
    pub fn load() -> UserConfig {
        Self::load_from(&Self::get_config_path())
    }

    pub fn load_from(path: &Path) -> UserConfig {
        if !path.exists() {
            let config = UserConfig::default();
            if let Ok(content) = toml::to_string_pretty(&config) {
                let _ = fs::write(path, content);
            }
            return config;
        }

        match fs::read_to_string(path) {
            Ok(content) => Self::parse(&content).unwrap_or_else(|e| {
                warn!(path = %path.display(), "Invalid config, using defaults: {}", e);
                UserConfig::default()
            }),
            Err(e) => {
                warn!(path = %path.display(), "Cannot read config, using defaults: {}", e);
                UserConfig::default()
            }
        }
    }

    pub fn parse(content: &str) -> Result<UserConfig, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = AppConfig::parse("").unwrap();
        assert_eq!(config, UserConfig::default());
        assert_eq!(config.menu_label, "Add to Queue After...");
        assert_eq!(config.readiness.poll_interval_ms, 100);
        assert_eq!(config.readiness.timeout_ms, None);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let config = AppConfig::parse(
            r#"
            max_queue_items = 200

            [readiness]
            timeout_ms = 5000

            [web]
            access_token = "abc"
            "#,
        )
        .unwrap();

        assert_eq!(config.slot_count(), 80);
        assert_eq!(config.readiness.poll_interval_ms, 100);
        assert_eq!(config.readiness.timeout_ms, Some(5000));
        assert_eq!(config.web.access_token.as_deref(), Some("abc"));
        assert_eq!(config.web.base_url, "https://api.spotify.com/v1");
        assert!(config.log.file);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut config = UserConfig::default();
        config.max_queue_items = 12;
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(AppConfig::parse(&text).unwrap(), config);
    }

    #[test]
    fn test_missing_file_writes_defaults() {
        let dir = std::env::temp_dir().join(format!("queue-after-test-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        let _ = fs::remove_file(&path);

        let config = AppConfig::load_from(&path);

        assert_eq!(config, UserConfig::default());
        assert!(path.exists());
        let _ = fs::remove_dir_all(&dir);
    }
}
