use anyhow::Context;
use apportion_io::ColumnAliases;
use serde::Deserialize;
use std::fs;
use tracing::{info, warn};

#[derive(Deserialize, Debug, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct LimitsConfig {
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self { max_upload_mb: default_max_upload_mb() }
    }
}

impl LimitsConfig {
    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct SessionConfig {
    /// Keep fixed income typed for a salesperson when a new file is uploaded.
    #[serde(default = "default_true")]
    pub retain_fixed_income_on_upload: bool,
    #[serde(default = "default_idle_timeout_minutes")]
    pub idle_timeout_minutes: i64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            retain_fixed_income_on_upload: true,
            idle_timeout_minutes: default_idle_timeout_minutes(),
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Deserialize, Debug, Clone)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { filter: default_log_filter(), format: LogFormat::default() }
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ApportionConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub columns: ColumnAliases,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ApportionConfig {
    /// Reads `APPORTION_CONFIG_PATH` (default `apportion.toml`), falling back to
    /// built-in defaults when the file does not exist.
    pub fn load() -> anyhow::Result<Self> {
        let config_path = std::env::var("APPORTION_CONFIG_PATH")
            .unwrap_or_else(|_| "apportion.toml".to_string());

        match fs::read_to_string(&config_path) {
            Ok(contents) => Self::from_toml(&contents)
                .with_context(|| format!("failed to parse configuration file '{config_path}'")),
            Err(_) => {
                warn!("Configuration file '{}' not found. Using default configuration.", config_path);
                Ok(Self::default())
            }
        }
    }

    pub fn from_toml(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Applies environment variable overrides.
    pub fn apply_profile(mut self) -> Self {
        if let Ok(host) = std::env::var("APPORTION_HOST") {
            self.server.host = host;
        }
        if let Some(port) = env_parse::<u16>("APPORTION_PORT") {
            self.server.port = port;
        }
        if let Some(max_upload_mb) = env_parse::<usize>("APPORTION_MAX_UPLOAD_MB") {
            self.limits.max_upload_mb = max_upload_mb;
        }
        if let Ok(format) = std::env::var("APPORTION_LOG_FORMAT") {
            match format.to_ascii_lowercase().as_str() {
                "json" => self.logging.format = LogFormat::Json,
                "compact" => self.logging.format = LogFormat::Compact,
                other => warn!(format = other, "ignoring unknown APPORTION_LOG_FORMAT"),
            }
        }

        info!(
            host = %self.server.host,
            port = self.server.port,
            max_upload_mb = self.limits.max_upload_mb,
            retain_fixed_income = self.session.retain_fixed_income_on_upload,
            "configuration resolved"
        );
        self
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(variable = name, value = %raw, "ignoring unparseable environment override");
            None
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    3000
}
fn default_max_upload_mb() -> usize {
    16
}
fn default_true() -> bool {
    true
}
fn default_idle_timeout_minutes() -> i64 {
    120
}
fn default_log_filter() -> String {
    "apportion=info,apportion_web=info,apportion_io=info,apportion_calculator=info,tower_http=info"
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = ApportionConfig::from_toml("").unwrap();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.limits.max_upload_bytes(), 16 * 1024 * 1024);
        assert!(config.session.retain_fixed_income_on_upload);
        assert_eq!(config.columns, ColumnAliases::default());
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn sections_override_defaults() {
        let config = ApportionConfig::from_toml(
            r#"
[server]
port = 8080

[session]
retain_fixed_income_on_upload = false

[columns]
salesperson = ["rep"]

[logging]
format = "json"
"#,
        )
        .unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(!config.session.retain_fixed_income_on_upload);
        assert_eq!(config.columns.salesperson, vec!["rep"]);
        assert_eq!(config.columns.amount, ColumnAliases::default().amount);
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(ApportionConfig::from_toml("[server]\nport = \"not a port\"").is_err());
    }
}
