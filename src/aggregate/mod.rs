//! Per-metric accumulation state and the fold/finalize algorithms.
//!
//! Counters and gauges are folded into a [`ScalarAggregate`]; histograms and
//! summaries into a [`WindowedSeries`] keyed by time window. Both live in a
//! single [`AggregateTables`] owned by the processor loop.
mod scalar;
mod series;
mod table;


pub use scalar::ScalarAggregate;
pub use series::WindowedSeries;
pub use table::{Aggregate, AggregateTables};
