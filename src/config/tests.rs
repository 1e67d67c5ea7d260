use std::time::Duration;

use clap::{CommandFactory, FromArgMatches};
use tempfile::tempdir;

use super::{DurationValue, apply_config, load_config_file, parse_duration_value};
use crate::args::TallyArgs;
use crate::error::{AppError, AppResult, ConfigError, ValidationError};
use crate::measurement::Resolution;
use crate::processor::{OverflowPolicy, StopPolicy};

fn write_config(name: &str, content: &str) -> AppResult<(tempfile::TempDir, std::path::PathBuf)> {
    let dir = tempdir()?;
    let path = dir.path().join(name);
    std::fs::write(&path, content)?;
    Ok((dir, path))
}

fn parse_cli(argv: &[&str]) -> AppResult<(TallyArgs, clap::ArgMatches)> {
    let matches = TallyArgs::command().try_get_matches_from(argv)?;
    let args = TallyArgs::from_arg_matches(&matches)?;
    Ok((args, matches))
}

#[test]
fn parse_toml_config() -> AppResult<()> {
    let (_dir, path) = write_config(
        "tally.toml",
        r#"
export_interval = "500ms"
export_timeout = 2
queue_capacity = 64
resolution = "minute"
overflow = "drop"
on_stop = "discard"
duration = 5
rate = 20

[sinks]
console = false

[sinks.prometheus]
path = "./metrics.prom"
"#,
    )?;

    let config = load_config_file(&path)?;
    if config.export_interval != Some(DurationValue::Text("500ms".to_owned())) {
        return Err(AppError::config("Unexpected export_interval"));
    }
    if config.export_timeout != Some(DurationValue::Seconds(2)) {
        return Err(AppError::config("Unexpected export_timeout"));
    }
    if config.queue_capacity != Some(64) || config.resolution != Some(Resolution::Minute) {
        return Err(AppError::config("Unexpected capacity or resolution"));
    }
    if config.overflow != Some(OverflowPolicy::Drop) || config.on_stop != Some(StopPolicy::Discard)
    {
        return Err(AppError::config("Unexpected policies"));
    }
    let sinks = config
        .sinks
        .ok_or_else(|| AppError::config("Expected sinks"))?;
    if sinks.console != Some(false) {
        return Err(AppError::config("Expected console disabled"));
    }
    match sinks.prometheus {
        Some(prometheus) if prometheus.path == "./metrics.prom" => Ok(()),
        Some(_) | None => Err(AppError::config("Unexpected prometheus sink")),
    }
}

#[test]
fn parse_json_config() -> AppResult<()> {
    let (_dir, path) = write_config(
        "tally.json",
        r#"{
  "export_interval": 15,
  "rate": 50,
  "sinks": { "influx": { "path": "./metrics.influx" } }
}"#,
    )?;

    let config = load_config_file(&path)?;
    if config.export_interval != Some(DurationValue::Seconds(15)) {
        return Err(AppError::config("Unexpected export_interval"));
    }
    if config.rate != Some(50) {
        return Err(AppError::config("Unexpected rate"));
    }
    let has_influx = config
        .sinks
        .as_ref()
        .and_then(|sinks| sinks.influx.as_ref())
        .is_some();
    if !has_influx {
        return Err(AppError::config("Expected influx sink"));
    }
    Ok(())
}

#[test]
fn unknown_field_is_rejected() -> AppResult<()> {
    let (_dir, path) = write_config("tally.toml", "flush_every = 3\n")?;
    match load_config_file(&path) {
        Err(AppError::Config(ConfigError::ParseToml { .. })) => Ok(()),
        Err(err) => Err(AppError::config(format!("Unexpected error: {}", err))),
        Ok(_) => Err(AppError::config("Expected parse failure")),
    }
}

#[test]
fn unsupported_extension_is_rejected() -> AppResult<()> {
    let (_dir, path) = write_config("tally.yaml", "rate: 1\n")?;
    match load_config_file(&path) {
        Err(AppError::Config(ConfigError::UnsupportedExtension { ext })) if ext == "yaml" => Ok(()),
        Err(err) => Err(AppError::config(format!("Unexpected error: {}", err))),
        Ok(_) => Err(AppError::config("Expected unsupported extension")),
    }
}

#[test]
fn missing_file_reports_read_error() -> AppResult<()> {
    let dir = tempdir()?;
    match load_config_file(&dir.path().join("absent.toml")) {
        Err(AppError::Config(ConfigError::ReadConfig { .. })) => Ok(()),
        Err(err) => Err(AppError::config(format!("Unexpected error: {}", err))),
        Ok(_) => Err(AppError::config("Expected read error")),
    }
}

#[test]
fn apply_config_fills_unset_flags() -> AppResult<()> {
    let (_dir, path) = write_config(
        "tally.toml",
        r#"
export_interval = "2m"
export_timeout = "250ms"
queue_capacity = 32
overflow = "drop"
duration = 9
"#,
    )?;
    let config = load_config_file(&path)?;
    let (mut args, matches) = parse_cli(&["tally"])?;
    apply_config(&mut args, &matches, &config)?;

    if args.export_interval != Duration::from_secs(120) {
        return Err(AppError::config("Config interval not applied"));
    }
    if args.export_timeout != Some(Duration::from_millis(250)) {
        return Err(AppError::config("Config timeout not applied"));
    }
    if args.queue_capacity.get() != 32 || args.target_duration.get() != 9 {
        return Err(AppError::config("Config capacity or duration not applied"));
    }
    if args.overflow != OverflowPolicy::Drop {
        return Err(AppError::config("Config overflow not applied"));
    }
    Ok(())
}

#[test]
fn cli_flags_override_config() -> AppResult<()> {
    let (_dir, path) = write_config("tally.toml", "export_interval = 60\nrate = 5\n")?;
    let config = load_config_file(&path)?;
    let (mut args, matches) = parse_cli(&["tally", "--interval", "1s", "--rate", "7"])?;
    apply_config(&mut args, &matches, &config)?;

    if args.export_interval != Duration::from_secs(1) {
        return Err(AppError::config("CLI interval was overridden"));
    }
    if args.rate.get() != 7 {
        return Err(AppError::config("CLI rate was overridden"));
    }
    Ok(())
}

#[test]
fn zero_capacity_in_config_is_rejected() -> AppResult<()> {
    let (_dir, path) = write_config("tally.toml", "queue_capacity = 0\n")?;
    let config = load_config_file(&path)?;
    let (mut args, matches) = parse_cli(&["tally"])?;
    match apply_config(&mut args, &matches, &config) {
        Err(ConfigError::FieldMustBePositive { field }) if field == "queue_capacity" => Ok(()),
        Err(err) => Err(AppError::config(format!("Unexpected error: {}", err))),
        Ok(()) => Err(AppError::config("Expected capacity rejection")),
    }
}

#[test]
fn zero_interval_in_config_is_rejected() -> AppResult<()> {
    let (_dir, path) = write_config("tally.toml", "export_interval = 0\n")?;
    let config = load_config_file(&path)?;
    let (mut args, matches) = parse_cli(&["tally"])?;
    match apply_config(&mut args, &matches, &config) {
        Err(ConfigError::InvalidField {
            field,
            source: ValidationError::DurationZero,
        }) if field == "export_interval" => Ok(()),
        Err(err) => Err(AppError::config(format!("Unexpected error: {}", err))),
        Ok(()) => Err(AppError::config("Expected interval rejection")),
    }
}

#[test]
fn parse_duration_units() -> AppResult<()> {
    let cases = [
        ("500ms", Duration::from_millis(500)),
        ("10s", Duration::from_secs(10)),
        ("7", Duration::from_secs(7)),
        ("2m", Duration::from_secs(120)),
        ("1h", Duration::from_secs(3600)),
    ];
    for (input, expected) in cases {
        let parsed = parse_duration_value(input)?;
        if parsed != expected {
            return Err(AppError::validation(format!(
                "{} parsed as {:?}",
                input, parsed
            )));
        }
    }
    Ok(())
}

#[test]
fn parse_duration_rejects_bad_input() -> AppResult<()> {
    let cases = ["", "ms", "10d", "0s", "99999999999999999999h"];
    for input in cases {
        if parse_duration_value(input).is_ok() {
            return Err(AppError::validation(format!("{} should not parse", input)));
        }
    }
    Ok(())
}
