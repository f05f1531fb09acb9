use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use tracing::instrument;

use super::{LogAlert, Notifier};
use crate::config::ResolvedTelegram;

/// Sends alerts through the Telegram Bot API `sendMessage` method
#[derive(Debug, Clone)]
pub struct TelegramNotifier {
    client: Client,
    config: ResolvedTelegram,
}

impl TelegramNotifier {
    pub fn new(client: Client, config: ResolvedTelegram) -> Self {
        Self { client, config }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_url.trim_end_matches('/'),
            self.config.token
        )
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &str {
        "telegram"
    }

    #[instrument(skip_all)]
    async fn notify(&self, alert: &LogAlert) -> anyhow::Result<()> {
        let text = alert.text();
        let response = self
            .client
            .get(self.endpoint())
            .query(&[("chat_id", self.config.chat_id.as_str()), ("text", text.as_str())])
            .send()
            .await
            .context("failed to send message to Telegram")?;

        if !response.status().is_success() {
            anyhow::bail!("Telegram message failed with status: {}", response.status());
        }

        Ok(())
    }
}
