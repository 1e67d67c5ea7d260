//! Immutable export payload produced once per flush.
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::aggregate::{ScalarAggregate, WindowedSeries};

/// Point-in-time view of one export interval.
///
/// Built once by the processor loop and shared behind an `Arc`; nothing
/// mutates it afterwards. The default value is the empty snapshot reported
/// before the first flush.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    /// Flush counter, starting at 1. Zero means no flush has happened yet.
    pub sequence: u64,
    pub flushed_at: Option<DateTime<Utc>>,
    pub counters: BTreeMap<String, ScalarAggregate>,
    pub gauges: BTreeMap<String, ScalarAggregate>,
    pub histograms: BTreeMap<String, WindowedSeries>,
    pub summaries: BTreeMap<String, WindowedSeries>,
}

impl Snapshot {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
            && self.gauges.is_empty()
            && self.histograms.is_empty()
            && self.summaries.is_empty()
    }

    /// Total number of aggregates across the four maps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.counters
            .len()
            .saturating_add(self.gauges.len())
            .saturating_add(self.histograms.len())
            .saturating_add(self.summaries.len())
    }

    pub fn scalars(&self) -> impl Iterator<Item = &ScalarAggregate> {
        self.counters.values().chain(self.gauges.values())
    }

    pub fn series(&self) -> impl Iterator<Item = &WindowedSeries> {
        self.histograms.values().chain(self.summaries.values())
    }
}
