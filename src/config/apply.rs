use clap::ArgMatches;
use clap::parser::ValueSource;

use crate::args::{PositiveU64, PositiveUsize, TallyArgs};
use crate::error::ConfigError;

use super::types::ConfigFile;

/// Applies configuration values to CLI arguments. Values given on the
/// command line are left alone.
///
/// # Errors
///
/// Returns an error when a config value is invalid.
pub fn apply_config(
    args: &mut TallyArgs,
    matches: &ArgMatches,
    config: &ConfigFile,
) -> Result<(), ConfigError> {
    if !is_cli(matches, "export_interval")
        && let Some(interval) = config.export_interval.as_ref()
    {
        args.export_interval = interval
            .to_duration()
            .map_err(|err| ConfigError::InvalidField {
                field: "export_interval",
                source: err,
            })?;
    }

    if !is_cli(matches, "export_timeout")
        && let Some(timeout) = config.export_timeout.as_ref()
    {
        let timeout = timeout
            .to_duration()
            .map_err(|err| ConfigError::InvalidField {
                field: "export_timeout",
                source: err,
            })?;
        args.export_timeout = Some(timeout);
    }

    if !is_cli(matches, "queue_capacity")
        && let Some(capacity) = config.queue_capacity
    {
        args.queue_capacity = PositiveUsize::try_from(capacity).map_err(|_err| {
            ConfigError::FieldMustBePositive {
                field: "queue_capacity",
            }
        })?;
    }

    if !is_cli(matches, "resolution")
        && let Some(resolution) = config.resolution
    {
        args.resolution = resolution;
    }

    if !is_cli(matches, "overflow")
        && let Some(overflow) = config.overflow
    {
        args.overflow = overflow;
    }

    if !is_cli(matches, "on_stop")
        && let Some(on_stop) = config.on_stop
    {
        args.on_stop = on_stop;
    }

    if !is_cli(matches, "target_duration")
        && let Some(duration) = config.duration
    {
        args.target_duration = ensure_positive_u64(duration, "duration")?;
    }

    if !is_cli(matches, "rate")
        && let Some(rate) = config.rate
    {
        args.rate = ensure_positive_u64(rate, "rate")?;
    }

    if let Some(sinks) = config.sinks.as_ref() {
        args.sinks = Some(sinks.clone());
    }

    Ok(())
}

fn is_cli(matches: &ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(ValueSource::CommandLine)
}

fn ensure_positive_u64(value: u64, field: &'static str) -> Result<PositiveU64, ConfigError> {
    PositiveU64::try_from(value).map_err(|_err| ConfigError::FieldMustBePositive { field })
}
