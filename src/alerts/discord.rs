use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use tracing::instrument;

use super::{LogAlert, Notifier};
use crate::Severity;
use crate::config::Discord;

/// Discord rejects embed descriptions longer than this
const MAX_DESCRIPTION_LEN: usize = 4096;

#[derive(Debug, Clone, Serialize)]
pub struct Message {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<EmbedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<EmbedFooter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    #[serde(default)]
    pub inline: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmbedFooter {
    pub text: String,
}

#[derive(Default)]
pub struct MessageBuilder {
    content: Option<String>,
    embeds: Vec<Embed>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: impl ToString) -> Self {
        self.content = Some(content.to_string());
        self
    }

    pub fn add_embed(mut self, embed: Embed) -> Self {
        self.embeds.push(embed);
        self
    }

    pub fn build(self) -> Message {
        Message {
            content: self.content,
            embeds: self.embeds,
        }
    }
}

fn severity_color(severity: Severity) -> u32 {
    match severity {
        Severity::Critical => 15158332, // Red
        Severity::Error => 15105570,    // Orange
        Severity::Warning => 16776960,  // Yellow
        _ => 5793266,                   // Light blue
    }
}

fn severity_emoji(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "🔴",
        Severity::Error => "🟠",
        Severity::Warning => "🟡",
        _ => "🔵",
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut truncated: String = text.chars().take(max_chars - 1).collect();
    truncated.push('…');
    truncated
}

/// Posts alerts to a Discord webhook as embeds
#[derive(Debug, Clone)]
pub struct DiscordNotifier {
    client: Client,
    config: Discord,
}

impl DiscordNotifier {
    pub fn new(client: Client, config: Discord) -> Self {
        Self { client, config }
    }

    pub fn build_log_embed(&self, alert: &LogAlert) -> Embed {
        let event = &alert.event;

        Embed {
            title: Some(format!(
                "{} {} Log Event",
                severity_emoji(event.severity),
                event.severity
            )),
            description: Some(truncate(&event.message, MAX_DESCRIPTION_LEN)),
            color: Some(severity_color(event.severity)),
            fields: vec![
                EmbedField {
                    name: "🆔 Event ID".to_string(),
                    value: event.id.to_string(),
                    inline: true,
                },
                EmbedField {
                    name: "⚠️ Type".to_string(),
                    value: event.severity.to_string(),
                    inline: true,
                },
                EmbedField {
                    name: "📒 Log".to_string(),
                    value: event.source_log.clone(),
                    inline: true,
                },
            ],
            footer: Some(EmbedFooter {
                text: format!("Watchdog | recorded {}", event.timestamp.to_rfc3339()),
            }),
            timestamp: Some(Utc::now().to_rfc3339()),
        }
    }

    pub fn build_message(&self, alert: &LogAlert) -> Message {
        let mut message_builder = MessageBuilder::new().add_embed(self.build_log_embed(alert));
        if let Some(user_id) = &self.config.user_id {
            message_builder = message_builder.content(format!(
                "{} {} event {} <@{user_id}>",
                severity_emoji(alert.event.severity),
                alert.event.severity,
                alert.event.id
            ));
        }
        message_builder.build()
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    fn name(&self) -> &str {
        "discord"
    }

    #[instrument(skip_all)]
    async fn notify(&self, alert: &LogAlert) -> anyhow::Result<()> {
        let message = self.build_message(alert);
        let response = self
            .client
            .post(&self.config.url)
            .json(&message)
            .send()
            .await
            .context("failed to send Discord message")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Discord message failed with status {status}: {body}");
        }

        Ok(())
    }
}
