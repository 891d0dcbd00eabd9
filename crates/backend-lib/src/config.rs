// ============================
// chatroom-backend-lib/src/config.rs
// ============================
//! Configuration management.
use std::net::SocketAddr;

use anyhow::{bail, Result};
use figment::providers::{Env, Format, Toml};
use figment::Figment;
use serde::Deserialize;

/// Application settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Log level seeding the tracing filter
    pub log_level: String,
    /// Per-connection outbound queue capacity
    pub outbound_buffer: usize,
    /// Terms rejected by the deny-list moderation policy
    pub blocked_terms: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".parse().unwrap(),
            log_level: "info".to_string(),
            outbound_buffer: 32,
            blocked_terms: Vec::new(),
        }
    }
}

impl Settings {
    /// Load settings from `config.toml` merged with `CHATROOM_*` environment
    /// variables
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load settings from a specific TOML file merged with `CHATROOM_*`
    /// environment variables
    pub fn load_from(path: &str) -> Result<Self> {
        let settings: Settings = Figment::new()
            .merge(Toml::file(path))
            .merge(Env::prefixed("CHATROOM_"))
            .extract()?;
        settings.validate()?;
        Ok(settings)
    }

    /// Check settings for values that would misconfigure the server
    pub fn validate(&self) -> Result<()> {
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.log_level.as_str()) {
            bail!("unknown log level: {}", self.log_level);
        }
        if self.outbound_buffer == 0 {
            bail!("outbound_buffer must be non-zero");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_validation() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());

        // Unknown log level
        let mut invalid_settings = settings.clone();
        invalid_settings.log_level = "noisy".to_string();
        assert!(invalid_settings.validate().is_err());

        // Zero-capacity outbound queue
        let mut invalid_settings = settings.clone();
        invalid_settings.outbound_buffer = 0;
        assert!(invalid_settings.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        std::fs::write(
            &config_path,
            r#"
            bind_addr = "0.0.0.0:4000"
            log_level = "debug"
            blocked_terms = ["spoilers"]
            "#,
        )
        .unwrap();

        let settings = Settings::load_from(config_path.to_str().unwrap()).unwrap();
        assert_eq!(settings.bind_addr.to_string(), "0.0.0.0:4000");
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.blocked_terms, vec!["spoilers"]);
        // Unset fields fall back to defaults
        assert_eq!(settings.outbound_buffer, 32);
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let settings = Settings::load_from("does-not-exist.toml").unwrap();
        assert_eq!(settings.bind_addr.to_string(), "127.0.0.1:3000");
        assert_eq!(settings.log_level, "info");
        assert!(settings.blocked_terms.is_empty());
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config_path = temp_dir.path().join("config.toml");

        std::fs::write(&config_path, "outbound_buffer = 0\n").unwrap();

        assert!(Settings::load_from(config_path.to_str().unwrap()).is_err());
    }
}
