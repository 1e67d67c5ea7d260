use serde::Deserialize;

use super::{
    ConsoleExporter, FanoutExporter, InfluxExporter, OtelJsonExporter, PrometheusExporter,
};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SinksConfig {
    pub console: Option<bool>,
    pub prometheus: Option<PrometheusSinkConfig>,
    pub otel: Option<OtelSinkConfig>,
    pub influx: Option<InfluxSinkConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PrometheusSinkConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OtelSinkConfig {
    pub path: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InfluxSinkConfig {
    pub path: String,
}

impl SinksConfig {
    /// Builds the exporter chain. Console output is on unless explicitly
    /// disabled.
    #[must_use]
    pub fn build(&self) -> FanoutExporter {
        let mut fanout = FanoutExporter::new();
        if self.console.unwrap_or(true) {
            fanout.push(Box::new(ConsoleExporter));
        }
        if let Some(prometheus) = self.prometheus.as_ref() {
            fanout.push(Box::new(PrometheusExporter::new(prometheus.path.as_str())));
        }
        if let Some(otel) = self.otel.as_ref() {
            fanout.push(Box::new(OtelJsonExporter::new(otel.path.as_str())));
        }
        if let Some(influx) = self.influx.as_ref() {
            fanout.push(Box::new(InfluxExporter::new(influx.path.as_str())));
        }
        fanout
    }
}
