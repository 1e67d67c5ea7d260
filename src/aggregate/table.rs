use std::collections::HashMap;
use std::collections::hash_map::Entry;

use chrono::{DateTime, Utc};

use super::scalar::{ScalarAggregate, ScalarPolicy};
use super::series::{BucketPolicy, WindowedSeries};
use crate::measurement::{Measurement, MetricKind, Resolution};
use crate::snapshot::Snapshot;

/// Accumulated state for one metric, tagged by its shape.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregate {
    Scalar(ScalarAggregate),
    Windowed(WindowedSeries),
}

impl Aggregate {
    fn start(measurement: Measurement, resolution: Resolution, now: DateTime<Utc>) -> Self {
        let (name, kind, tags, timestamp, value) = measurement.into_parts();
        match kind {
            MetricKind::Counter => Aggregate::Scalar(ScalarAggregate::start(
                name,
                kind,
                tags,
                ScalarPolicy::Accumulate,
                value,
                now,
            )),
            MetricKind::Gauge => Aggregate::Scalar(ScalarAggregate::start(
                name,
                kind,
                tags,
                ScalarPolicy::LastWrite,
                value,
                now,
            )),
            MetricKind::Histogram => {
                let mut series = WindowedSeries::start(
                    name,
                    kind,
                    tags,
                    BucketPolicy::Replace,
                    resolution,
                    now,
                );
                series.fold(timestamp, value, now);
                Aggregate::Windowed(series)
            }
            MetricKind::Summary => {
                let mut series = WindowedSeries::start(
                    name,
                    kind,
                    tags,
                    BucketPolicy::Accumulate,
                    resolution,
                    now,
                );
                series.fold(timestamp, value, now);
                Aggregate::Windowed(series)
            }
        }
    }

    fn fold(&mut self, timestamp: DateTime<Utc>, value: f64, now: DateTime<Utc>) {
        match self {
            Aggregate::Scalar(scalar) => scalar.fold(value, now),
            Aggregate::Windowed(series) => series.fold(timestamp, value, now),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Aggregate::Scalar(scalar) => scalar.is_empty(),
            Aggregate::Windowed(series) => series.is_empty(),
        }
    }
}

/// The working set of aggregates for one export interval.
///
/// Entries are keyed by kind and name, so a counter and a gauge may share a
/// name without colliding.
#[derive(Debug, Default)]
pub struct AggregateTables {
    resolution: Resolution,
    entries: HashMap<(MetricKind, String), Aggregate>,
    samples: u64,
}

impl AggregateTables {
    #[must_use]
    pub fn new(resolution: Resolution) -> Self {
        Self {
            resolution,
            entries: HashMap::new(),
            samples: 0,
        }
    }

    /// Folds one measurement into its aggregate, creating it on first sight.
    pub fn record(&mut self, measurement: Measurement, now: DateTime<Utc>) {
        self.samples = self.samples.saturating_add(1);
        let key = (measurement.kind(), measurement.name().to_owned());
        match self.entries.entry(key) {
            Entry::Occupied(mut entry) => {
                entry
                    .get_mut()
                    .fold(measurement.timestamp(), measurement.value(), now);
            }
            Entry::Vacant(entry) => {
                entry.insert(Aggregate::start(measurement, self.resolution, now));
            }
        }
    }

    #[must_use]
    pub fn get(&self, kind: MetricKind, name: &str) -> Option<&Aggregate> {
        self.entries.get(&(kind, name.to_owned()))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of measurements folded since these tables were created.
    #[must_use]
    pub const fn samples(&self) -> u64 {
        self.samples
    }

    /// Moves the current aggregates out, leaving fresh empty tables behind.
    pub fn detach(&mut self) -> AggregateTables {
        let resolution = self.resolution;
        std::mem::replace(self, AggregateTables::new(resolution))
    }

    /// Finalizes every series and assembles the export payload. Empty
    /// aggregates are dropped rather than exported as zeros.
    #[must_use]
    pub fn into_snapshot(self, sequence: u64, flushed_at: DateTime<Utc>) -> Snapshot {
        let mut snapshot = Snapshot {
            sequence,
            flushed_at: Some(flushed_at),
            ..Snapshot::default()
        };

        for ((kind, name), aggregate) in self.entries {
            if aggregate.is_empty() {
                continue;
            }
            match (kind, aggregate) {
                (MetricKind::Counter, Aggregate::Scalar(scalar)) => {
                    snapshot.counters.insert(name, scalar);
                }
                (MetricKind::Gauge, Aggregate::Scalar(scalar)) => {
                    snapshot.gauges.insert(name, scalar);
                }
                (MetricKind::Histogram, Aggregate::Windowed(mut series)) => {
                    series.finalize();
                    snapshot.histograms.insert(name, series);
                }
                (MetricKind::Summary, Aggregate::Windowed(mut series)) => {
                    series.finalize();
                    snapshot.summaries.insert(name, series);
                }
                (kind, aggregate) => {
                    tracing::error!(
                        "Skipping aggregate '{}' with mismatched shape for {}: {:?}",
                        name,
                        kind,
                        aggregate
                    );
                }
            }
        }

        snapshot
    }
}
