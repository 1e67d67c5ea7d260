use std::time::Duration;

use serde::Deserialize;

use crate::error::ValidationError;
use crate::exporter::SinksConfig;
use crate::measurement::Resolution;
use crate::processor::{OverflowPolicy, StopPolicy};

/// On-disk configuration. Every field is optional; CLI flags win.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub export_interval: Option<DurationValue>,
    pub export_timeout: Option<DurationValue>,
    pub queue_capacity: Option<usize>,
    pub resolution: Option<Resolution>,
    pub overflow: Option<OverflowPolicy>,
    pub on_stop: Option<StopPolicy>,
    /// Driver run time in seconds.
    pub duration: Option<u64>,
    /// Driver rounds per second.
    pub rate: Option<u64>,
    pub sinks: Option<SinksConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Seconds(u64),
    Text(String),
}

impl DurationValue {
    /// # Errors
    ///
    /// Returns an error for zero seconds or an unparsable duration string.
    pub fn to_duration(&self) -> Result<Duration, ValidationError> {
        match self {
            DurationValue::Seconds(secs) => {
                if *secs == 0 {
                    Err(ValidationError::DurationZero)
                } else {
                    Ok(Duration::from_secs(*secs))
                }
            }
            DurationValue::Text(text) => super::parse_duration_value(text),
        }
    }
}
