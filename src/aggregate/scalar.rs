use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::measurement::{MetricKind, Tags};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum ScalarPolicy {
    /// Counter: samples are summed.
    Accumulate,
    /// Gauge: the latest sample replaces the value.
    LastWrite,
}

/// Running statistics for one counter or gauge.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScalarAggregate {
    pub name: String,
    pub kind: MetricKind,
    pub tags: Tags,
    pub value: f64,
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub avg: f64,
    pub created_at: DateTime<Utc>,
    pub last_at: DateTime<Utc>,
    #[serde(skip)]
    policy: ScalarPolicy,
}

impl ScalarAggregate {
    pub(super) fn start(
        name: String,
        kind: MetricKind,
        tags: Tags,
        policy: ScalarPolicy,
        value: f64,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            name,
            kind,
            tags,
            value,
            count: 1,
            min: value,
            max: value,
            avg: value,
            created_at: now,
            last_at: now,
            policy,
        }
    }

    pub(super) fn fold(&mut self, value: f64, now: DateTime<Utc>) {
        self.count = self.count.saturating_add(1);
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.last_at = now;

        match self.policy {
            ScalarPolicy::Accumulate => {
                self.value += value;
                self.avg = self.value / self.count as f64;
            }
            ScalarPolicy::LastWrite => {
                self.value = value;
                // Midrange, not the arithmetic mean.
                self.avg = (self.min + self.max) / 2.0;
            }
        }
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.count == 0
    }
}
