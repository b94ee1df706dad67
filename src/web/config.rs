use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::time::Duration;
use thiserror::Error;

use crate::tracking::ReconnectPolicy;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid reconnect settings: {0}")]
    Reconnect(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub stream: StreamConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub api_keys: Vec<ApiKey>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StreamConfig {
    pub base_url: String,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_stale_after", deserialize_with = "deserialize_duration")]
    pub stale_after: Duration,
    #[serde(default)]
    pub reconnect: ReconnectPolicy,
}

fn default_stale_after() -> Duration {
    Duration::from_secs(30)
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiKey {
    pub key: String,
    pub name: String,
    pub permissions: HashSet<Permission>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    Watch,
    ViewStatus,
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config
            .stream
            .reconnect
            .validate()
            .map_err(ConfigError::Reconnect)?;
        Ok(config)
    }

    pub fn find_api_key(&self, key: &str) -> Option<&ApiKey> {
        self.api_keys.iter().find(|k| k.key == key)
    }
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config = Config::from_str(
            r#"
stream:
  base_url: wss://api.example.com
  token: secret
  stale_after: 1m
  reconnect:
    initial_delay: 2s
    max_attempts: 0
web:
  bind: 0.0.0.0:9000
api_keys:
  - key: k1
    name: dashboard
    permissions: [watch, view_status]
"#,
        )
        .unwrap();

        assert_eq!(config.stream.token.as_deref(), Some("secret"));
        assert_eq!(config.stream.stale_after, Duration::from_secs(60));
        assert_eq!(config.stream.reconnect.initial_delay, Duration::from_secs(2));
        assert_eq!(config.stream.reconnect.max_attempts, 0);
        assert_eq!(config.web.bind, "0.0.0.0:9000");

        let key = config.find_api_key("k1").unwrap();
        assert!(key.permissions.contains(&Permission::Watch));
        assert!(config.find_api_key("nope").is_none());
    }

    #[test]
    fn applies_defaults() {
        let config = Config::from_str("stream:\n  base_url: ws://localhost:8081\n").unwrap();

        assert_eq!(config.web.bind, "127.0.0.1:8080");
        assert_eq!(config.stream.stale_after, Duration::from_secs(30));
        assert_eq!(config.stream.reconnect, ReconnectPolicy::default());
        assert!(config.api_keys.is_empty());
    }

    #[test]
    fn rejects_bad_duration() {
        assert!(Config::from_str("stream:\n  base_url: ws://x\n  stale_after: soon\n").is_err());
    }

    #[test]
    fn rejects_non_finite_reconnect_settings() {
        let err = Config::from_str(
            "stream:\n  base_url: ws://localhost:8081\n  reconnect:\n    jitter_factor: .nan\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Reconnect(_)));

        let err = Config::from_str(
            "stream:\n  base_url: ws://localhost:8081\n  reconnect:\n    multiplier: .inf\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Reconnect(_)));
    }
}
