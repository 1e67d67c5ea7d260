use clap::Parser;
use std::time::Duration;

use crate::exporter::{InfluxSinkConfig, OtelSinkConfig, PrometheusSinkConfig, SinksConfig};
use crate::measurement::Resolution;
use crate::processor::{OverflowPolicy, ProcessorConfig, StopPolicy};

use super::parsers::{
    parse_bool_env, parse_duration_arg, parse_overflow, parse_positive_u64,
    parse_positive_usize, parse_resolution, parse_stop_policy,
};
use super::types::{PositiveU64, PositiveUsize};

#[derive(Debug, Parser, Clone)]
#[clap(
    version,
    about = "In-process metrics aggregation - feeds a synthetic workload through the aggregation processor and flushes snapshots to console, Prometheus, OTel JSON or Influx files.",
    next_help_heading = "Advanced Options"
)]
pub struct TallyArgs {
    /// Path to config file (TOML/JSON). Defaults to ./tally.toml or ./tally.json if present.
    #[arg(long, short = 'c', help_heading = "Common Options")]
    pub config: Option<String>,

    /// Time between flushes (supports ms/s/m/h)
    #[arg(
        long = "interval",
        short = 'i',
        default_value = "10s",
        value_parser = parse_duration_arg,
        help_heading = "Common Options"
    )]
    pub export_interval: Duration,

    /// Abandon an exporter call after this long (supports ms/s/m/h)
    #[arg(long = "export-timeout", value_parser = parse_duration_arg)]
    pub export_timeout: Option<Duration>,

    /// Measurement queue capacity
    #[arg(long = "queue-capacity", default_value = "256", value_parser = parse_positive_usize)]
    pub queue_capacity: PositiveUsize,

    /// Window size for histogram and summary series (second, minute, hour, day)
    #[arg(long, default_value = "second", value_parser = parse_resolution)]
    pub resolution: Resolution,

    /// Full-queue behaviour (block, drop)
    #[arg(long, default_value = "block", value_parser = parse_overflow)]
    pub overflow: OverflowPolicy,

    /// What to do with the partial interval on stop (flush, discard)
    #[arg(long = "on-stop", default_value = "flush", value_parser = parse_stop_policy)]
    pub on_stop: StopPolicy,

    /// Workload duration in seconds
    #[arg(
        long = "duration",
        short = 't',
        default_value = "30",
        value_parser = parse_positive_u64,
        help_heading = "Common Options"
    )]
    pub target_duration: PositiveU64,

    /// Workload rounds per second; each round emits every tester series once
    #[arg(
        long = "rate",
        short = 'r',
        default_value = "10",
        value_parser = parse_positive_u64,
        help_heading = "Common Options"
    )]
    pub rate: PositiveU64,

    /// Write Prometheus text exposition to this path on every flush
    #[arg(long = "prometheus", help_heading = "Sinks")]
    pub prometheus_path: Option<String>,

    /// Write OTel-style JSON to this path on every flush
    #[arg(long = "otel", help_heading = "Sinks")]
    pub otel_path: Option<String>,

    /// Write Influx line protocol to this path on every flush
    #[arg(long = "influx", help_heading = "Sinks")]
    pub influx_path: Option<String>,

    /// Do not print snapshots to stdout
    #[arg(long = "no-console", help_heading = "Sinks")]
    pub no_console: bool,

    /// Enable verbose logging (sets log level to debug unless overridden by TALLY_LOG/RUST_LOG)
    #[arg(long, short = 'v', alias = "debug", help_heading = "Common Options")]
    pub verbose: bool,

    /// Disable color output
    #[arg(long = "no-color", env = "NO_COLOR", value_parser = parse_bool_env)]
    pub no_color: bool,

    #[arg(skip)]
    pub sinks: Option<SinksConfig>,
}

impl TallyArgs {
    #[must_use]
    pub fn processor_config(&self) -> ProcessorConfig {
        ProcessorConfig {
            export_interval: self.export_interval,
            export_timeout: self.export_timeout,
            queue_capacity: self.queue_capacity.get(),
            resolution: self.resolution,
            overflow: self.overflow,
            on_stop: self.on_stop,
        }
    }

    /// Sinks from the config file with the sink flags layered on top.
    #[must_use]
    pub fn sinks_config(&self) -> SinksConfig {
        let mut sinks = self.sinks.clone().unwrap_or_default();
        if self.no_console {
            sinks.console = Some(false);
        }
        if let Some(path) = self.prometheus_path.as_ref() {
            sinks.prometheus = Some(PrometheusSinkConfig { path: path.clone() });
        }
        if let Some(path) = self.otel_path.as_ref() {
            sinks.otel = Some(OtelSinkConfig { path: path.clone() });
        }
        if let Some(path) = self.influx_path.as_ref() {
            sinks.influx = Some(InfluxSinkConfig { path: path.clone() });
        }
        sinks
    }
}
