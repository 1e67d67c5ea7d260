use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Tag set attached to a measurement. Ordering carries no meaning.
pub type Tags = BTreeMap<String, String>;

const SECONDS_PER_MINUTE: i64 = 60;
const SECONDS_PER_HOUR: i64 = 3_600;
const SECONDS_PER_DAY: i64 = 86_400;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MetricKind {
    Counter,
    Gauge,
    Histogram,
    Summary,
}

impl MetricKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            MetricKind::Counter => "counter",
            MetricKind::Gauge => "gauge",
            MetricKind::Histogram => "histogram",
            MetricKind::Summary => "summary",
        }
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "counter" => Ok(MetricKind::Counter),
            "gauge" => Ok(MetricKind::Gauge),
            "histogram" => Ok(MetricKind::Histogram),
            "summary" => Ok(MetricKind::Summary),
            _ => Err(ValidationError::UnknownMetricKind {
                value: s.to_owned(),
            }),
        }
    }
}

/// Window granularity for histogram and summary series.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    #[default]
    Second,
    Minute,
    Hour,
    Day,
}

impl Resolution {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Resolution::Second => "second",
            Resolution::Minute => "minute",
            Resolution::Hour => "hour",
            Resolution::Day => "day",
        }
    }

    #[must_use]
    pub const fn seconds(self) -> i64 {
        match self {
            Resolution::Second => 1,
            Resolution::Minute => SECONDS_PER_MINUTE,
            Resolution::Hour => SECONDS_PER_HOUR,
            Resolution::Day => SECONDS_PER_DAY,
        }
    }

    /// Truncates `at` to the start of its window and returns it as epoch
    /// seconds. Days are UTC days.
    #[must_use]
    pub fn window_key(self, at: DateTime<Utc>) -> i64 {
        let secs = at.timestamp();
        let width = self.seconds();
        secs.div_euclid(width).saturating_mul(width)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "second" | "s" => Ok(Resolution::Second),
            "minute" | "m" => Ok(Resolution::Minute),
            "hour" | "h" => Ok(Resolution::Hour),
            "day" | "d" => Ok(Resolution::Day),
            _ => Err(ValidationError::UnknownResolution {
                value: s.to_owned(),
            }),
        }
    }
}

/// One observed sample submitted by a producer.
///
/// Construction validates the name and value, so anything that reaches the
/// processor queue is already well-formed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    name: String,
    kind: MetricKind,
    tags: Tags,
    timestamp: DateTime<Utc>,
    value: f64,
}

impl Measurement {
    /// Builds a measurement stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns `EmptyMetricName` for a blank name and `NonFiniteValue` when
    /// `value` is NaN or infinite.
    pub fn new<N>(
        name: N,
        kind: MetricKind,
        tags: Option<Tags>,
        value: f64,
    ) -> Result<Self, ValidationError>
    where
        N: Into<String>,
    {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::EmptyMetricName);
        }
        if !value.is_finite() {
            return Err(ValidationError::NonFiniteValue { name, value });
        }
        Ok(Self {
            name,
            kind,
            tags: tags.unwrap_or_default(),
            timestamp: Utc::now(),
            value,
        })
    }

    /// # Errors
    ///
    /// See [`Measurement::new`].
    pub fn counter<N: Into<String>>(name: N, value: f64) -> Result<Self, ValidationError> {
        Self::new(name, MetricKind::Counter, None, value)
    }

    /// # Errors
    ///
    /// See [`Measurement::new`].
    pub fn gauge<N: Into<String>>(name: N, value: f64) -> Result<Self, ValidationError> {
        Self::new(name, MetricKind::Gauge, None, value)
    }

    /// # Errors
    ///
    /// See [`Measurement::new`].
    pub fn histogram<N: Into<String>>(name: N, value: f64) -> Result<Self, ValidationError> {
        Self::new(name, MetricKind::Histogram, None, value)
    }

    /// # Errors
    ///
    /// See [`Measurement::new`].
    pub fn summary<N: Into<String>>(name: N, value: f64) -> Result<Self, ValidationError> {
        Self::new(name, MetricKind::Summary, None, value)
    }

    #[must_use]
    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    #[must_use]
    pub fn with_tag<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.tags.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> MetricKind {
        self.kind
    }

    #[must_use]
    pub const fn tags(&self) -> &Tags {
        &self.tags
    }

    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[must_use]
    pub const fn value(&self) -> f64 {
        self.value
    }
}

impl Measurement {
    pub(crate) fn into_parts(self) -> (String, MetricKind, Tags, DateTime<Utc>, f64) {
        (self.name, self.kind, self.tags, self.timestamp, self.value)
    }
}
