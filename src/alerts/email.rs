use anyhow::Context;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::instrument;

use super::{LogAlert, Notifier};
use crate::config::ResolvedEmail;

const SUBJECT: &str = "Watchdog Alert";

/// Sends alerts as plain-text e-mail over SMTP with STARTTLS
pub struct EmailNotifier {
    config: ResolvedEmail,
    mailer: AsyncSmtpTransport<Tokio1Executor>,
}

impl EmailNotifier {
    /// Build the SMTP transport. No connection is opened until the first alert.
    pub fn new(config: ResolvedEmail) -> anyhow::Result<Self> {
        let credentials = Credentials::new(config.from.clone(), config.password.clone());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_server)
            .with_context(|| format!("invalid SMTP server {}", config.smtp_server))?
            .port(config.port)
            .credentials(credentials)
            .build();

        Ok(Self { config, mailer })
    }

    pub fn build_message(&self, alert: &LogAlert) -> anyhow::Result<Message> {
        Message::builder()
            .from(self.config.from.parse().context("invalid sender address")?)
            .to(self.config.to.parse().context("invalid recipient address")?)
            .subject(SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(alert.text())
            .context("failed to build alert e-mail")
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &str {
        "email"
    }

    #[instrument(skip_all)]
    async fn notify(&self, alert: &LogAlert) -> anyhow::Result<()> {
        let message = self.build_message(alert)?;
        self.mailer
            .send(message)
            .await
            .context("failed to send alert e-mail")?;
        Ok(())
    }
}
