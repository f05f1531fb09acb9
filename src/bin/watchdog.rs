use std::sync::Arc;

use clap::Parser;
use tracing::{info, level_filters::LevelFilter, trace, warn};
use tracing_subscriber::{filter, layer::SubscriberExt, util::SubscriberInitExt};
use watchdog::{
    actors::{CollectorHandle, Pipeline},
    alerts::{AlertManager, dedup::AlertDeduplicator},
    config::{Config, read_config_file},
    sources::{CommandEventSource, SystemMetricSource},
    storage::{EventStore, MetricWindow},
    util,
};

#[derive(Debug, Clone, Parser)]
struct Args {
    /// Config file (JSON); defaults apply when omitted
    #[arg(short)]
    file: Option<String>,
}

fn init() {
    let filter = filter::Targets::new().with_targets(vec![
        ("watchdog", LevelFilter::TRACE),
        ("tower_http", LevelFilter::DEBUG),
    ]);
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .compact()
                .with_ansi(false),
        )
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    util::load_env();
    init();
    let args = Args::parse();
    trace!("started with args: {args:?}");

    let config = match &args.file {
        Some(file) => read_config_file(file)?,
        None => Config::default(),
    };

    let events = Arc::new(EventStore::new());
    let metrics = Arc::new(MetricWindow::new(config.retention()));

    let alerts = AlertManager::from_config(&config.alerts)?;
    if alerts.channel_count() == 0 {
        warn!("no alert channels configured, suspicious logs are only written to the log");
    }

    let pipeline = Pipeline {
        event_source: Arc::new(CommandEventSource::from_config(&config.events)?),
        metric_source: Arc::new(SystemMetricSource::from_config(&config.metrics)),
        deduplicator: Arc::new(AlertDeduplicator::new()),
        alerts: Arc::new(alerts),
        events: events.clone(),
        metrics: metrics.clone(),
    };

    let collector = CollectorHandle::spawn(pipeline, config.interval());
    info!("collecting every {:?}", config.interval());

    #[cfg(feature = "api")]
    {
        use watchdog::api::{ApiState, spawn_api_server};

        spawn_api_server(config.api.clone(), ApiState::new(events, metrics)).await?;
    }

    tokio::signal::ctrl_c().await?;
    info!("shutting down");
    collector.shutdown().await?;

    Ok(())
}
