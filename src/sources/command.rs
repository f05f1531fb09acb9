//! Event source backed by the platform's log query command
//!
//! On Unix the journal is read with `journalctl -o json`; on Windows the
//! Application, System and Security logs are read with PowerShell's
//! `Get-WinEvent` and converted to JSON. The child process is killed when the
//! configured timeout elapses.

use std::hash::{DefaultHasher, Hash, Hasher};
use std::process::Stdio;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Deserialize;
use tokio::process::Command;
use tracing::{instrument, trace, warn};

use super::{EventSource, RawLogEvent};
use crate::config::{EventFormat, EventSourceConfig};
use crate::severity::journald_level;

/// PowerShell 5 serializes `DateTime` as `/Date(<unix millis>)/`
static WIN_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/Date\((-?\d+)").expect("date pattern is valid"));

#[derive(Debug, Clone)]
pub struct CommandEventSource {
    program: String,
    args: Vec<String>,
    format: EventFormat,
    timeout: Duration,
}

/// Built-in query for `format`, returning at most `max_events` entries
pub fn default_command(format: EventFormat, max_events: usize) -> Vec<String> {
    match format {
        EventFormat::Journald => vec![
            "journalctl".to_string(),
            "-o".to_string(),
            "json".to_string(),
            "-n".to_string(),
            max_events.to_string(),
            "--no-pager".to_string(),
            "-q".to_string(),
        ],
        EventFormat::WinEvent => vec![
            "powershell".to_string(),
            "-NoProfile".to_string(),
            "-Command".to_string(),
            format!(
                "Get-WinEvent -LogName 'Application','System','Security' -MaxEvents {max_events} \
                 -ErrorAction SilentlyContinue \
                 | Select-Object TimeCreated, Id, LevelDisplayName, LogName, Message \
                 | ConvertTo-Json -Depth 5"
            ),
        ],
    }
}

impl CommandEventSource {
    pub fn new(
        command: Vec<String>,
        format: EventFormat,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let mut command = command.into_iter();
        let program = command
            .next()
            .context("event query command must not be empty")?;

        Ok(Self {
            program,
            args: command.collect(),
            format,
            timeout,
        })
    }

    pub fn from_config(config: &EventSourceConfig) -> anyhow::Result<Self> {
        let command = config
            .command
            .clone()
            .unwrap_or_else(|| default_command(config.format, config.max_events));

        Self::new(
            command,
            config.format,
            Duration::from_secs(config.timeout_secs),
        )
    }
}

#[async_trait]
impl EventSource for CommandEventSource {
    #[instrument(skip(self), fields(program = %self.program))]
    async fn fetch(&self) -> anyhow::Result<Vec<RawLogEvent>> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, command.output())
            .await
            .with_context(|| format!("event query timed out after {:?}", self.timeout))?
            .context("failed to run event query")?;

        if !output.status.success() && output.stdout.is_empty() {
            anyhow::bail!(
                "event query exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let events = parse_events(self.format, &stdout)?;
        trace!("event query returned {} entries", events.len());
        Ok(events)
    }
}

pub fn parse_events(format: EventFormat, output: &str) -> anyhow::Result<Vec<RawLogEvent>> {
    match format {
        EventFormat::Journald => Ok(parse_journald(output)),
        EventFormat::WinEvent => parse_win_events(output),
    }
}

#[derive(Debug, Deserialize)]
struct JournalRecord {
    #[serde(rename = "__CURSOR")]
    cursor: Option<String>,
    #[serde(rename = "__SEQNUM")]
    seqnum: Option<String>,
    #[serde(rename = "__REALTIME_TIMESTAMP")]
    realtime: String,
    #[serde(rename = "PRIORITY")]
    priority: Option<String>,
    #[serde(rename = "MESSAGE")]
    message: Option<serde_json::Value>,
    #[serde(rename = "SYSLOG_IDENTIFIER")]
    identifier: Option<String>,
    #[serde(rename = "_SYSTEMD_UNIT")]
    unit: Option<String>,
}

/// journald encodes non-UTF-8 messages as an array of bytes
fn journal_message(value: Option<serde_json::Value>) -> String {
    match value {
        Some(serde_json::Value::String(message)) => message,
        Some(serde_json::Value::Array(bytes)) => {
            let bytes: Vec<u8> = bytes
                .iter()
                .filter_map(|b| b.as_u64().and_then(|b| u8::try_from(b).ok()))
                .collect();
            String::from_utf8_lossy(&bytes).into_owned()
        }
        _ => String::new(),
    }
}

impl JournalRecord {
    /// Entries written in the same microsecond share a timestamp, so the id
    /// comes from the cursor, then the sequence number, then the timestamp.
    fn entry_id(&self, micros: u64) -> u64 {
        if let Some(cursor) = &self.cursor {
            let mut hasher = DefaultHasher::new();
            cursor.hash(&mut hasher);
            return hasher.finish();
        }
        self.seqnum
            .as_deref()
            .and_then(|seqnum| seqnum.parse().ok())
            .unwrap_or(micros)
    }

    fn into_raw(self) -> Option<RawLogEvent> {
        let micros: u64 = self.realtime.parse().ok()?;
        let id = self.entry_id(micros);
        let timestamp = DateTime::from_timestamp_micros(i64::try_from(micros).ok()?)?;
        let priority = self
            .priority
            .as_deref()
            .and_then(|p| p.parse::<u8>().ok())
            .unwrap_or(6);

        Some(RawLogEvent {
            id,
            timestamp,
            level: journald_level(priority).to_string(),
            message: journal_message(self.message),
            source_log: self
                .identifier
                .or(self.unit)
                .unwrap_or_else(|| "journal".to_string()),
        })
    }
}

/// Parse `journalctl -o json` output; malformed lines are skipped.
fn parse_journald(output: &str) -> Vec<RawLogEvent> {
    output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let record = serde_json::from_str::<JournalRecord>(line)
                .inspect_err(|e| warn!("skipping malformed journal entry: {e}"))
                .ok()?;
            let raw = record.into_raw();
            if raw.is_none() {
                warn!("skipping journal entry with invalid timestamp");
            }
            raw
        })
        .collect()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct WinEventRecord {
    id: u64,
    time_created: Option<String>,
    level_display_name: Option<String>,
    log_name: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WinEventOutput {
    Many(Vec<WinEventRecord>),
    One(WinEventRecord),
}

fn parse_win_date(value: &str) -> Option<DateTime<Utc>> {
    if let Some(captures) = WIN_DATE.captures(value) {
        let millis: i64 = captures[1].parse().ok()?;
        return DateTime::from_timestamp_millis(millis);
    }

    DateTime::parse_from_rfc3339(value)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

/// Parse `ConvertTo-Json` output, which is a single object when only one
/// event matched and nothing at all when none did.
fn parse_win_events(output: &str) -> anyhow::Result<Vec<RawLogEvent>> {
    let output = output.trim();
    if output.is_empty() {
        return Ok(Vec::new());
    }

    let records = match serde_json::from_str::<WinEventOutput>(output)
        .context("failed to parse Get-WinEvent output")?
    {
        WinEventOutput::Many(records) => records,
        WinEventOutput::One(record) => vec![record],
    };

    Ok(records
        .into_iter()
        .filter_map(|record| {
            let Some(timestamp) = record.time_created.as_deref().and_then(parse_win_date) else {
                warn!("skipping event {} without a valid TimeCreated", record.id);
                return None;
            };

            Some(RawLogEvent {
                id: record.id,
                timestamp,
                level: record.level_display_name.unwrap_or_default(),
                message: record.message.unwrap_or_default(),
                source_log: record.log_name.unwrap_or_default(),
            })
        })
        .collect())
}
