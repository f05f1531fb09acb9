//! Alert dispatch for severe log events
//!
//! The collector decides *whether* to alert through the [`AlertDeduplicator`];
//! the [`AlertManager`] decides *where*: it fans a [`LogAlert`] out to every
//! configured [`Notifier`] channel. Channels are attempted concurrently and
//! independently. A failing channel is logged and never stops its siblings or
//! the ingestion tick that triggered it.

pub mod dedup;
pub mod discord;
pub mod email;
pub mod telegram;
pub mod webhook;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use futures::future::join_all;
use tracing::{debug, error, info, instrument};

use crate::LogEvent;
use crate::config::AlertChannel;

pub use dedup::{AlertDeduplicator, AlertKey};

/// Timeout for outbound HTTP alert requests
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// A notification about a single suspicious log event
#[derive(Debug, Clone, PartialEq)]
pub struct LogAlert {
    pub event: LogEvent,
}

impl LogAlert {
    pub fn new(event: LogEvent) -> Self {
        Self { event }
    }

    /// Plain-text rendering used by the text based channels
    pub fn text(&self) -> String {
        format!(
            "Log Alert, a suspicious log has been detected.\nID: {}\nType: {}\nMessage: {}",
            self.event.id, self.event.severity, self.event.message
        )
    }
}

/// A single outbound alert channel
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Channel name used in logs
    fn name(&self) -> &str;

    /// Deliver the alert. Errors are reported to the [`AlertManager`], which
    /// logs them.
    async fn notify(&self, alert: &LogAlert) -> anyhow::Result<()>;
}

/// Outcome of one dispatch across all channels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub delivered: usize,
    pub failed: usize,
}

/// Fans alerts out to every configured channel
#[derive(Clone, Default)]
pub struct AlertManager {
    channels: Vec<Arc<dyn Notifier>>,
}

impl fmt::Debug for AlertManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AlertManager")
            .field(
                "channels",
                &self.channels.iter().map(|c| c.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl AlertManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_channel(mut self, channel: Arc<dyn Notifier>) -> Self {
        self.channels.push(channel);
        self
    }

    /// Build the manager from the configured channel list.
    ///
    /// Telegram and e-mail settings missing from the file are resolved from the
    /// environment; a channel that cannot be resolved is a configuration error.
    pub fn from_config(channels: &[AlertChannel]) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        let mut manager = Self::new();
        for channel in channels {
            let notifier: Arc<dyn Notifier> = match channel {
                AlertChannel::Discord(config) => Arc::new(discord::DiscordNotifier::new(
                    client.clone(),
                    config.clone(),
                )),
                AlertChannel::Webhook(config) => Arc::new(webhook::WebhookNotifier::new(
                    client.clone(),
                    config.clone(),
                )),
                AlertChannel::Telegram(config) => Arc::new(telegram::TelegramNotifier::new(
                    client.clone(),
                    config.resolve()?,
                )),
                AlertChannel::Email(config) => {
                    Arc::new(email::EmailNotifier::new(config.resolve()?)?)
                }
            };
            debug!("configured {} alert channel", notifier.name());
            manager = manager.with_channel(notifier);
        }

        Ok(manager)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Send the alert to every channel.
    #[instrument(skip_all, fields(event_id = alert.event.id, severity = %alert.event.severity))]
    pub async fn dispatch(&self, alert: &LogAlert) -> DispatchReport {
        if self.channels.is_empty() {
            debug!("no alert channels configured, dropping alert");
            return DispatchReport::default();
        }

        let results = join_all(self.channels.iter().map(|channel| async move {
            (channel.name(), channel.notify(alert).await)
        }))
        .await;

        let mut report = DispatchReport::default();
        for (name, result) in results {
            match result {
                Ok(()) => {
                    info!("sent alert via {name}");
                    report.delivered += 1;
                }
                Err(e) => {
                    error!("failed to send alert via {name}: {e:#}");
                    report.failed += 1;
                }
            }
        }

        report
    }
}
