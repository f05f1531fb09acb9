use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use tracing::trace;

use crate::util;

const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    /// Polling interval in seconds
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// How long metric samples are retained, in minutes
    #[serde(default = "default_retention_minutes")]
    pub retention_minutes: u64,

    #[serde(default)]
    pub events: EventSourceConfig,

    #[serde(default)]
    pub metrics: MetricSourceConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub alerts: Vec<AlertChannel>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            retention_minutes: default_retention_minutes(),
            events: EventSourceConfig::default(),
            metrics: MetricSourceConfig::default(),
            api: ApiConfig::default(),
            alerts: Vec::new(),
        }
    }
}

impl Config {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval.max(1))
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_minutes.saturating_mul(60))
    }
}

/// Output format of the platform's event log query
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventFormat {
    /// `journalctl -o json`, one JSON object per line
    Journald,
    /// PowerShell `Get-WinEvent | ConvertTo-Json`
    WinEvent,
}

impl Default for EventFormat {
    fn default() -> Self {
        if cfg!(windows) {
            EventFormat::WinEvent
        } else {
            EventFormat::Journald
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct EventSourceConfig {
    #[serde(default)]
    pub format: EventFormat,

    /// Number of most recent entries requested per poll
    #[serde(default = "default_max_events")]
    pub max_events: usize,

    /// Upper bound for a single query, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Replaces the built-in query command (program followed by arguments)
    pub command: Option<Vec<String>>,
}

impl Default for EventSourceConfig {
    fn default() -> Self {
        Self {
            format: EventFormat::default(),
            max_events: default_max_events(),
            timeout_secs: default_timeout_secs(),
            command: None,
        }
    }
}

#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct MetricSourceConfig {
    /// Mount point whose usage is reported as disk utilization
    pub disk_mount: Option<PathBuf>,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ApiConfig {
    /// Bind address (e.g., "0.0.0.0:8080")
    #[serde(default = "default_bind_addr")]
    pub bind_addr: SocketAddr,

    /// Enable CORS for browser dashboards
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            enable_cors: default_enable_cors(),
        }
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertChannel {
    Discord(Discord),
    Webhook(Webhook),
    Telegram(Telegram),
    Email(Email),
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Webhook {
    pub url: String,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Discord {
    pub url: String,
    pub user_id: Option<String>,
}

/// Telegram bot settings; missing values come from `TELEGRAM_TOKEN` and
/// `TELEGRAM_CHAT_ID`
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Telegram {
    pub token: Option<String>,
    pub chat_id: Option<String>,
    pub api_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTelegram {
    pub token: String,
    pub chat_id: String,
    pub api_url: String,
}

impl Telegram {
    pub fn resolve(&self) -> anyhow::Result<ResolvedTelegram> {
        Ok(ResolvedTelegram {
            token: util::setting_or_env(&self.token, util::TELEGRAM_TOKEN)?,
            chat_id: util::setting_or_env(&self.chat_id, util::TELEGRAM_CHAT_ID)?,
            api_url: self
                .api_url
                .clone()
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API.to_string()),
        })
    }
}

/// SMTP settings; missing values come from `SMTP_SERVER`, `EMAIL_SRC`,
/// `EMAIL_DST` and `EMAIL_PASSWD`
#[derive(Debug, Clone, Default, serde::Deserialize)]
pub struct Email {
    pub smtp_server: Option<String>,
    pub port: Option<u16>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedEmail {
    pub smtp_server: String,
    pub port: u16,
    pub from: String,
    pub to: String,
    pub password: String,
}

impl Email {
    pub fn resolve(&self) -> anyhow::Result<ResolvedEmail> {
        Ok(ResolvedEmail {
            smtp_server: util::setting_or_env(&self.smtp_server, util::SMTP_SERVER)?,
            port: self.port.unwrap_or(util::DEFAULT_SMTP_PORT),
            from: util::setting_or_env(&self.from, util::EMAIL_SRC)?,
            to: util::setting_or_env(&self.to, util::EMAIL_DST)?,
            password: util::setting_or_env(&self.password, util::EMAIL_PASSWD)?,
        })
    }
}

fn default_interval() -> u64 {
    10
}

fn default_retention_minutes() -> u64 {
    11
}

fn default_max_events() -> usize {
    10
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_bind_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8080))
}

fn default_enable_cors() -> bool {
    true
}

pub fn read_config_file(path: impl AsRef<Path>) -> anyhow::Result<Config> {
    let path = path.as_ref();
    let file_content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    serde_json::from_str(&file_content)
        .with_context(|| format!("invalid configuration file {}", path.display()))
        .inspect(|config| trace!("loaded config: {config:?}"))
}
