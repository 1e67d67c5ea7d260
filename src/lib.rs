//! In-process metrics aggregation.
//!
//! Producers send typed [`measurement::Measurement`]s to a
//! [`processor::Processor`]. A single tokio task owns the aggregate tables,
//! folds counters, gauges, histograms and summaries as they arrive, and on
//! every export interval detaches the tables into an immutable
//! [`snapshot::Snapshot`] that is handed to an [`exporter::Exporter`].
//!
//! The `tally` binary wraps this in a small driver that feeds a synthetic
//! workload through the processor and writes snapshots to the configured
//! sinks.
pub mod aggregate;
pub mod args;
pub mod config;
pub mod entry;
pub mod error;
pub mod exporter;
pub mod logger;
pub mod measurement;
pub mod processor;
pub mod shutdown;
pub mod snapshot;
