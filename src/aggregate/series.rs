use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::measurement::{MetricKind, Resolution, Tags};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum BucketPolicy {
    /// Histogram: the last write in a window wins.
    Replace,
    /// Summary: writes in a window are summed.
    Accumulate,
}

/// Time-windowed samples for one histogram or summary.
///
/// `buckets` maps a window key (epoch seconds truncated to `resolution`) to
/// the value held for that window. The derived fields (`count`, `sum`,
/// `avg`, `min`, `max` and the percentiles) are only meaningful after
/// [`WindowedSeries::finalize`], which the processor runs once per flush.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WindowedSeries {
    pub name: String,
    pub kind: MetricKind,
    pub tags: Tags,
    pub resolution: Resolution,
    pub buckets: BTreeMap<i64, f64>,
    /// Raw number of samples folded in, independent of how many windows
    /// they landed in.
    pub samples: u64,
    pub count: usize,
    pub sum: f64,
    pub avg: f64,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub p50: Option<f64>,
    pub p90: Option<f64>,
    pub p99: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub last_at: DateTime<Utc>,
    #[serde(skip)]
    policy: BucketPolicy,
}

impl WindowedSeries {
    pub(super) fn start(
        name: String,
        kind: MetricKind,
        tags: Tags,
        policy: BucketPolicy,
        resolution: Resolution,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            name,
            kind,
            tags,
            resolution,
            buckets: BTreeMap::new(),
            samples: 0,
            count: 0,
            sum: 0.0,
            avg: 0.0,
            min: None,
            max: None,
            p50: None,
            p90: None,
            p99: None,
            created_at: now,
            last_at: now,
            policy,
        }
    }

    pub(super) fn fold(&mut self, timestamp: DateTime<Utc>, value: f64, now: DateTime<Utc>) {
        let key = self.resolution.window_key(timestamp);
        match self.policy {
            BucketPolicy::Replace => {
                self.buckets.insert(key, value);
            }
            BucketPolicy::Accumulate => {
                *self.buckets.entry(key).or_insert(0.0) += value;
            }
        }
        self.samples = self.samples.saturating_add(1);
        self.last_at = now;
    }

    /// Computes the derived statistics from the current buckets.
    pub fn finalize(&mut self) {
        let mut values: Vec<f64> = self.buckets.values().copied().collect();
        values.sort_unstable_by(f64::total_cmp);

        self.count = values.len();
        self.sum = values.iter().sum();
        self.min = values.first().copied();
        self.max = values.last().copied();
        self.avg = if self.samples > 0 && self.count > 0 {
            self.sum / self.count as f64
        } else {
            0.0
        };
        self.p50 = percentile(&values, 50);
        self.p90 = percentile(&values, 90);
        self.p99 = percentile(&values, 99);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Nearest-rank percentile over already sorted values.
fn percentile(sorted: &[f64], percentile: usize) -> Option<f64> {
    let last = sorted.len().checked_sub(1)?;
    let index = percentile.saturating_mul(last).saturating_add(50) / 100;
    sorted.get(index).copied()
}
