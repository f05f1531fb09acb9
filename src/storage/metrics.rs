//! Time-bounded window of resource samples
//!
//! Samples are kept in ascending timestamp order in a `VecDeque`. Every write
//! runs the retention sweep from the oldest end, so eviction costs O(k) in the
//! number of evicted samples. Averages walk from the newest end and stop at the
//! first sample outside the requested duration.

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::trace;

use crate::MetricSample;

/// Default retention horizon (11 minutes)
pub const DEFAULT_RETENTION: Duration = Duration::from_secs(11 * 60);

/// Concurrency-safe sliding window of [`MetricSample`]s
#[derive(Debug)]
pub struct MetricWindow {
    horizon: Duration,
    samples: RwLock<VecDeque<MetricSample>>,
}

impl Default for MetricWindow {
    fn default() -> Self {
        Self::new(DEFAULT_RETENTION)
    }
}

/// Oldest timestamp whose age is still within `duration` of `now`
fn cutoff(now: DateTime<Utc>, duration: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(duration)
        .ok()
        .and_then(|duration| now.checked_sub_signed(duration))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

impl MetricWindow {
    pub fn new(horizon: Duration) -> Self {
        Self {
            horizon,
            samples: RwLock::new(VecDeque::new()),
        }
    }

    pub fn horizon(&self) -> Duration {
        self.horizon
    }

    pub async fn record(&self, sample: MetricSample) {
        self.record_at(sample, Utc::now()).await;
    }

    /// Record a sample and evict everything older than `now - horizon`.
    pub async fn record_at(&self, sample: MetricSample, now: DateTime<Utc>) {
        let mut samples = self.samples.write().await;

        match samples.back() {
            Some(last) if sample.timestamp < last.timestamp => {
                let position = samples.partition_point(|s| s.timestamp <= sample.timestamp);
                samples.insert(position, sample);
            }
            _ => samples.push_back(sample),
        }

        let cutoff = cutoff(now, self.horizon);
        let mut evicted = 0;
        while samples.front().is_some_and(|s| s.timestamp < cutoff) {
            samples.pop_front();
            evicted += 1;
        }

        trace!("recorded sample, evicted {evicted} (retained: {})", samples.len());
    }

    /// Most recent sample, or the zero sentinel when nothing was recorded yet
    pub async fn latest(&self) -> MetricSample {
        self.samples
            .read()
            .await
            .back()
            .cloned()
            .unwrap_or_default()
    }

    pub async fn average_over(&self, duration: Duration) -> MetricSample {
        self.average_over_at(duration, Utc::now()).await
    }

    /// Mean of every retained sample whose age at `now` is at most `duration`.
    ///
    /// Temperature is averaged over the samples that carry one. Returns the
    /// zero sentinel when no sample qualifies.
    pub async fn average_over_at(&self, duration: Duration, now: DateTime<Utc>) -> MetricSample {
        let cutoff = cutoff(now, duration);
        let samples = self.samples.read().await;

        let mut count = 0usize;
        let (mut cpu, mut ram, mut disk) = (0.0, 0.0, 0.0);
        let mut temperature_count = 0usize;
        let mut temperature = 0.0;

        for sample in samples.iter().rev().take_while(|s| s.timestamp >= cutoff) {
            count += 1;
            cpu += sample.cpu_percent;
            ram += sample.ram_percent;
            disk += sample.disk_percent;
            if let Some(celsius) = sample.temperature_celsius {
                temperature_count += 1;
                temperature += celsius;
            }
        }

        if count == 0 {
            return MetricSample::default();
        }

        let n = count as f64;
        MetricSample {
            timestamp: now,
            cpu_percent: cpu / n,
            ram_percent: ram / n,
            disk_percent: disk / n,
            temperature_celsius: (temperature_count > 0)
                .then(|| temperature / temperature_count as f64),
        }
    }

    pub async fn len(&self) -> usize {
        self.samples.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.samples.read().await.is_empty()
    }

    /// Copy of every retained sample, oldest first
    pub async fn samples(&self) -> Vec<MetricSample> {
        self.samples.read().await.iter().cloned().collect()
    }
}
