use anyhow::anyhow;

pub const TELEGRAM_TOKEN: &str = "TELEGRAM_TOKEN";

pub const TELEGRAM_CHAT_ID: &str = "TELEGRAM_CHAT_ID";

pub const SMTP_SERVER: &str = "SMTP_SERVER";

pub const EMAIL_SRC: &str = "EMAIL_SRC";

pub const EMAIL_DST: &str = "EMAIL_DST";

pub const EMAIL_PASSWD: &str = "EMAIL_PASSWD";

pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Loads `.env` from the working directory, if present
pub fn load_env() {
    dotenv::dotenv().ok();
}

/// Use the configured value, falling back to the environment variable `var`.
pub fn setting_or_env(value: &Option<String>, var: &str) -> anyhow::Result<String> {
    match value {
        Some(value) => Ok(value.clone()),
        None => std::env::var(var)
            .ok()
            .filter(|value| !value.is_empty())
            .ok_or_else(|| anyhow!("{var} is neither configured nor set in the environment")),
    }
}
