use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde_json::json;
use tracing::instrument;

use super::{LogAlert, Notifier};
use crate::config::Webhook;

/// Posts alerts as JSON to an arbitrary HTTP endpoint
#[derive(Debug, Clone)]
pub struct WebhookNotifier {
    client: Client,
    config: Webhook,
}

impl WebhookNotifier {
    pub fn new(client: Client, config: Webhook) -> Self {
        Self { client, config }
    }

    pub fn payload(&self, alert: &LogAlert) -> serde_json::Value {
        json!({
            "message": alert.text(),
            "id": alert.event.id,
            "severity": alert.event.severity,
            "source_log": alert.event.source_log,
            "timestamp": alert.event.timestamp.to_rfc3339(),
            "sent_at": Utc::now().to_rfc3339(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    fn name(&self) -> &str {
        "webhook"
    }

    #[instrument(skip_all)]
    async fn notify(&self, alert: &LogAlert) -> anyhow::Result<()> {
        let response = self
            .client
            .post(&self.config.url)
            .json(&self.payload(alert))
            .send()
            .await
            .context("failed to send webhook alert")?;

        if !response.status().is_success() {
            anyhow::bail!("webhook alert failed with status: {}", response.status());
        }

        Ok(())
    }
}
