use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;
use chrono::Utc;
use sysinfo::{Components, Disks, System};
use tracing::{instrument, warn};

use super::MetricSource;
use crate::MetricSample;
use crate::config::MetricSourceConfig;

/// Samples CPU, memory, disk and temperature through `sysinfo`
#[derive(Debug, Clone)]
pub struct SystemMetricSource {
    disk_mount: PathBuf,
}

fn default_disk_mount() -> PathBuf {
    if cfg!(windows) {
        PathBuf::from("C:\\")
    } else {
        PathBuf::from("/")
    }
}

impl Default for SystemMetricSource {
    fn default() -> Self {
        Self {
            disk_mount: default_disk_mount(),
        }
    }
}

impl SystemMetricSource {
    pub fn new(disk_mount: impl Into<PathBuf>) -> Self {
        Self {
            disk_mount: disk_mount.into(),
        }
    }

    pub fn from_config(config: &MetricSourceConfig) -> Self {
        config
            .disk_mount
            .clone()
            .map(Self::new)
            .unwrap_or_default()
    }
}

#[async_trait]
impl MetricSource for SystemMetricSource {
    #[instrument(skip(self))]
    async fn sample(&self) -> anyhow::Result<MetricSample> {
        let mount = self.disk_mount.clone();
        tokio::task::spawn_blocking(move || collect_sample(&mount))
            .await
            .context("metric sampling task failed")
    }
}

fn percent(used: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    used as f64 / total as f64 * 100.0
}

/// Usage of the disk with the longest mount point containing `mount`
fn disk_usage(disks: &Disks, mount: &Path) -> Option<f64> {
    disks
        .iter()
        .filter(|disk| mount.starts_with(disk.mount_point()))
        .max_by_key(|disk| disk.mount_point().as_os_str().len())
        .map(|disk| {
            let total = disk.total_space();
            percent(total.saturating_sub(disk.available_space()), total)
        })
}

fn collect_sample(mount: &Path) -> MetricSample {
    let mut sys = System::new();
    sys.refresh_cpu_usage();
    std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);
    sys.refresh_cpu_usage();
    sys.refresh_memory();

    let cpu = f64::from(sys.global_cpu_usage()).clamp(0.0, 100.0);
    let ram = percent(sys.used_memory(), sys.total_memory());

    let disks = Disks::new_with_refreshed_list();
    let disk = disk_usage(&disks, mount).unwrap_or_else(|| {
        warn!("no disk mounted at {}, reporting 0", mount.display());
        0.0
    });

    let components = Components::new_with_refreshed_list();
    let temperature = components
        .iter()
        .filter_map(|component| component.temperature())
        .find(|temperature| *temperature > 0.0)
        .map(f64::from);

    let sample = MetricSample::new(Utc::now(), cpu, ram, disk);
    match temperature {
        Some(celsius) => sample.with_temperature(celsius),
        None => sample,
    }
}
