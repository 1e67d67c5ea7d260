use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{Value, json};

use super::Exporter;
use super::format::{influx_escape, influx_tags, prometheus_labels, prometheus_name, write_line};
use crate::aggregate::{ScalarAggregate, WindowedSeries};
use crate::error::ExportError;
use crate::measurement::{MetricKind, Tags};
use crate::snapshot::Snapshot;

/// Writes the snapshot as a Prometheus text exposition file.
#[derive(Debug, Clone)]
pub struct PrometheusExporter {
    path: String,
}

impl PrometheusExporter {
    #[must_use]
    pub fn new<P: Into<String>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Exporter for PrometheusExporter {
    fn name(&self) -> &'static str {
        "prometheus"
    }

    async fn export(&self, snapshot: &Snapshot) -> Result<(), ExportError> {
        let output = render_prometheus(snapshot)?;
        tokio::fs::write(&self.path, output)
            .await
            .map_err(|err| ExportError::Write {
                exporter: "prometheus",
                path: self.path.clone(),
                source: err,
            })
    }
}

pub(super) fn render_prometheus(snapshot: &Snapshot) -> Result<String, ExportError> {
    let families = FamilyNames::new(snapshot);
    let mut output = String::new();

    for counter in snapshot.counters.values() {
        let name = families.name(&counter.name, counter.kind);
        write_scalar_family(&mut output, &name, counter, "counter")?;
    }
    for gauge in snapshot.gauges.values() {
        let name = families.name(&gauge.name, gauge.kind);
        write_scalar_family(&mut output, &name, gauge, "gauge")?;
    }
    for series in snapshot.series() {
        let name = families.name(&series.name, series.kind);
        write_series_family(&mut output, &name, series)?;
    }

    Ok(output)
}

/// Sanitized family names; a name shared by several kinds gets the kind as
/// a suffix on every family that uses it.
struct FamilyNames {
    uses: BTreeMap<String, usize>,
}

impl FamilyNames {
    fn new(snapshot: &Snapshot) -> Self {
        let mut uses: BTreeMap<String, usize> = BTreeMap::new();
        let names = snapshot
            .scalars()
            .map(|scalar| &scalar.name)
            .chain(snapshot.series().map(|series| &series.name));
        for name in names {
            let count = uses.entry(prometheus_name(name)).or_default();
            *count = count.saturating_add(1);
        }
        Self { uses }
    }

    fn name(&self, metric: &str, kind: MetricKind) -> String {
        let base = prometheus_name(metric);
        if self.uses.get(&base).copied().unwrap_or(0) > 1 {
            format!("{}_{}", base, kind.as_str())
        } else {
            base
        }
    }
}

fn write_scalar_family(
    output: &mut String,
    name: &str,
    scalar: &ScalarAggregate,
    type_name: &str,
) -> Result<(), ExportError> {
    write_line(output, &format!("# TYPE {} {}", name, type_name))?;
    write_line(
        output,
        &format!(
            "{}{} {}",
            name,
            prometheus_labels(&scalar.tags, &[]),
            scalar.value
        ),
    )?;

    let count = scalar.count.to_string();
    let min = scalar.min.to_string();
    let max = scalar.max.to_string();
    let avg = scalar.avg.to_string();
    write_stats(
        output,
        name,
        &scalar.tags,
        &[
            ("count", count.as_str()),
            ("min", min.as_str()),
            ("max", max.as_str()),
            ("avg", avg.as_str()),
        ],
    )
}

fn write_series_family(
    output: &mut String,
    name: &str,
    series: &WindowedSeries,
) -> Result<(), ExportError> {
    write_line(output, &format!("# TYPE {} summary", name))?;
    for (quantile, value) in [("0.5", series.p50), ("0.9", series.p90), ("0.99", series.p99)] {
        if let Some(value) = value {
            write_line(
                output,
                &format!(
                    "{}{} {}",
                    name,
                    prometheus_labels(&series.tags, &[("quantile", quantile)]),
                    value
                ),
            )?;
        }
    }
    let labels = prometheus_labels(&series.tags, &[]);
    write_line(output, &format!("{}_sum{} {}", name, labels, series.sum))?;
    write_line(
        output,
        &format!("{}_count{} {}", name, labels, series.samples),
    )?;

    let windows = series.count.to_string();
    let avg = series.avg.to_string();
    let mut stats: Vec<(&str, &str)> = vec![("windows", windows.as_str()), ("avg", avg.as_str())];
    let min = series.min.map(|value| value.to_string());
    let max = series.max.map(|value| value.to_string());
    if let Some(min) = min.as_deref() {
        stats.push(("min", min));
    }
    if let Some(max) = max.as_deref() {
        stats.push(("max", max));
    }
    write_stats(output, name, &series.tags, &stats)
}

fn write_stats(
    output: &mut String,
    name: &str,
    tags: &Tags,
    stats: &[(&str, &str)],
) -> Result<(), ExportError> {
    write_line(output, &format!("# TYPE {}_stats gauge", name))?;
    for &(stat, value) in stats {
        write_line(
            output,
            &format!(
                "{}_stats{} {}",
                name,
                prometheus_labels(tags, &[("stat", stat)]),
                value
            ),
        )?;
    }
    Ok(())
}

/// Writes the snapshot as an OTel-flavoured JSON document.
#[derive(Debug, Clone)]
pub struct OtelJsonExporter {
    path: String,
}

impl OtelJsonExporter {
    #[must_use]
    pub fn new<P: Into<String>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Exporter for OtelJsonExporter {
    fn name(&self) -> &'static str {
        "otel"
    }

    async fn export(&self, snapshot: &Snapshot) -> Result<(), ExportError> {
        let payload = render_otel(snapshot);
        let json = serde_json::to_vec_pretty(&payload).map_err(|err| ExportError::Serialize {
            exporter: "otel",
            source: err,
        })?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|err| ExportError::Write {
                exporter: "otel",
                path: self.path.clone(),
                source: err,
            })
    }
}

pub(super) fn render_otel(snapshot: &Snapshot) -> Value {
    let mut metrics: Vec<Value> = snapshot
        .scalars()
        .map(|scalar| {
            json!({
                "name": scalar.name,
                "type": scalar.kind.as_str(),
                "attributes": scalar.tags,
                "value": scalar.value,
                "count": scalar.count,
                "min": scalar.min,
                "max": scalar.max,
                "avg": scalar.avg,
                "start_time": scalar.created_at.to_rfc3339(),
                "time": scalar.last_at.to_rfc3339(),
            })
        })
        .collect();
    metrics.extend(snapshot.series().map(|series| {
        json!({
            "name": series.name,
            "type": series.kind.as_str(),
            "attributes": series.tags,
            "resolution": series.resolution.as_str(),
            "samples": series.samples,
            "windows": series.count,
            "sum": series.sum,
            "avg": series.avg,
            "min": series.min,
            "max": series.max,
            "quantiles": { "0.5": series.p50, "0.9": series.p90, "0.99": series.p99 },
            "start_time": series.created_at.to_rfc3339(),
            "time": series.last_at.to_rfc3339(),
        })
    }));

    json!({
        "resource": {
            "service.name": "tally"
        },
        "sequence": snapshot.sequence,
        "flushed_at": snapshot.flushed_at.map(|at| at.to_rfc3339()),
        "metrics": metrics
    })
}

/// Writes the snapshot in Influx line protocol, one line per aggregate.
#[derive(Debug, Clone)]
pub struct InfluxExporter {
    path: String,
}

impl InfluxExporter {
    #[must_use]
    pub fn new<P: Into<String>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Exporter for InfluxExporter {
    fn name(&self) -> &'static str {
        "influx"
    }

    async fn export(&self, snapshot: &Snapshot) -> Result<(), ExportError> {
        let output = render_influx(snapshot)?;
        tokio::fs::write(&self.path, output)
            .await
            .map_err(|err| ExportError::Write {
                exporter: "influx",
                path: self.path.clone(),
                source: err,
            })
    }
}

pub(super) fn render_influx(snapshot: &Snapshot) -> Result<String, ExportError> {
    let timestamp = snapshot
        .flushed_at
        .and_then(|at| at.timestamp_nanos_opt())
        .map(|nanos| format!(" {}", nanos))
        .unwrap_or_default();
    let mut output = String::new();

    for scalar in snapshot.scalars() {
        write_line(
            &mut output,
            &format!(
                "{}{} value={},count={}i,min={},max={},avg={}{}",
                influx_escape(&scalar.name),
                influx_tags(scalar.kind.as_str(), &scalar.tags),
                scalar.value,
                scalar.count,
                scalar.min,
                scalar.max,
                scalar.avg,
                timestamp
            ),
        )?;
    }

    for series in snapshot.series() {
        let mut fields = vec![
            format!("sum={}", series.sum),
            format!("avg={}", series.avg),
            format!("windows={}i", series.count),
            format!("samples={}i", series.samples),
        ];
        let optional = [
            ("min", series.min),
            ("max", series.max),
            ("p50", series.p50),
            ("p90", series.p90),
            ("p99", series.p99),
        ];
        fields.extend(
            optional
                .iter()
                .filter_map(|(field, value)| value.map(|value| format!("{}={}", field, value))),
        );
        write_line(
            &mut output,
            &format!(
                "{}{} {}{}",
                influx_escape(&series.name),
                influx_tags(series.kind.as_str(), &series.tags),
                fields.join(","),
                timestamp
            ),
        )?;
    }

    Ok(output)
}
