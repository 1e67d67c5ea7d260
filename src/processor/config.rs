use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ProcessorError, ValidationError};
use crate::measurement::Resolution;

pub const DEFAULT_EXPORT_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// What `send` does when the measurement queue is full.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverflowPolicy {
    /// Wait for the loop to make room.
    #[default]
    Block,
    /// Discard the measurement and count it.
    Drop,
}

impl OverflowPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            OverflowPolicy::Block => "block",
            OverflowPolicy::Drop => "drop",
        }
    }
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OverflowPolicy {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "block" => Ok(OverflowPolicy::Block),
            "drop" => Ok(OverflowPolicy::Drop),
            _ => Err(ValidationError::UnknownOverflowPolicy {
                value: value.to_owned(),
            }),
        }
    }
}

/// What happens to the partial interval when the processor stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopPolicy {
    #[default]
    Flush,
    Discard,
}

impl StopPolicy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            StopPolicy::Flush => "flush",
            StopPolicy::Discard => "discard",
        }
    }
}

impl fmt::Display for StopPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StopPolicy {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "flush" => Ok(StopPolicy::Flush),
            "discard" => Ok(StopPolicy::Discard),
            _ => Err(ValidationError::UnknownStopPolicy {
                value: value.to_owned(),
            }),
        }
    }
}

/// Lifecycle of a processor loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProcessorState {
    #[default]
    Created,
    Running,
    Stopping,
    Stopped,
}

impl ProcessorState {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ProcessorState::Created => "created",
            ProcessorState::Running => "running",
            ProcessorState::Stopping => "stopping",
            ProcessorState::Stopped => "stopped",
        }
    }
}

impl fmt::Display for ProcessorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorConfig {
    pub export_interval: Duration,
    /// Upper bound on a single exporter call. `None` waits indefinitely.
    pub export_timeout: Option<Duration>,
    pub queue_capacity: usize,
    pub resolution: Resolution,
    pub overflow: OverflowPolicy,
    pub on_stop: StopPolicy,
}

impl Default for ProcessorConfig {
    fn default() -> Self {
        Self {
            export_interval: DEFAULT_EXPORT_INTERVAL,
            export_timeout: None,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            resolution: Resolution::default(),
            overflow: OverflowPolicy::default(),
            on_stop: StopPolicy::default(),
        }
    }
}

impl ProcessorConfig {
    #[must_use]
    pub fn with_interval(export_interval: Duration) -> Self {
        Self {
            export_interval,
            ..Self::default()
        }
    }

    /// Checks the values the loop cannot run with.
    ///
    /// # Errors
    ///
    /// Returns `ProcessorError::InvalidConfig` for a zero interval, a zero
    /// export timeout or a zero queue capacity.
    pub fn validate(&self) -> Result<(), ProcessorError> {
        if self.export_interval.is_zero() {
            return Err(ProcessorError::InvalidConfig {
                field: "export_interval",
                source: ValidationError::DurationZero,
            });
        }
        if self.export_timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(ProcessorError::InvalidConfig {
                field: "export_timeout",
                source: ValidationError::DurationZero,
            });
        }
        if self.queue_capacity == 0 {
            return Err(ProcessorError::InvalidConfig {
                field: "queue_capacity",
                source: ValidationError::ValueTooSmall { min: 1 },
            });
        }
        Ok(())
    }
}
