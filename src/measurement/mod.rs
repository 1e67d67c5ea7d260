//! Measurement value objects and the metric vocabulary shared by the
//! aggregation layer.
mod types;


pub use types::{Measurement, MetricKind, Resolution, Tags};
