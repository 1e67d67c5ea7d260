use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{TimeZone, Utc};

use super::writers::{render_influx, render_otel, render_prometheus};
use super::{
    ConsoleExporter, Exporter, FanoutExporter, FnExporter, NoopExporter, PrometheusExporter,
    SinksConfig,
};
use crate::aggregate::AggregateTables;
use crate::error::{AppError, AppResult, ExportError};
use crate::measurement::{Measurement, Resolution};
use crate::snapshot::Snapshot;

fn run_async_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|err| AppError::export(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}

fn sample_snapshot() -> AppResult<Snapshot> {
    let at = Utc
        .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
        .single()
        .ok_or_else(|| AppError::export("invalid fixture time"))?;
    let mut tables = AggregateTables::new(Resolution::Second);
    let measurements = [
        Measurement::counter("http.requests", 2.0)?.with_tag("route", "/a b"),
        Measurement::counter("http.requests", 3.0)?.with_tag("route", "/a b"),
        Measurement::gauge("queue_depth", 7.0)?,
        Measurement::histogram("latency", 12.0)?,
        Measurement::summary("bytes", 100.0)?,
        Measurement::summary("bytes", 50.0)?,
    ];
    for measurement in measurements {
        tables.record(measurement.with_timestamp(at), at);
    }
    Ok(tables.into_snapshot(4, at))
}

#[test]
fn prometheus_output_lists_every_family() -> AppResult<()> {
    let output = render_prometheus(&sample_snapshot()?)?;
    let expected = [
        "# TYPE http_requests counter",
        "http_requests{route=\"/a b\"} 5",
        "http_requests_stats{route=\"/a b\",stat=\"count\"} 2",
        "# TYPE queue_depth gauge",
        "queue_depth 7",
        "# TYPE latency summary",
        "latency{quantile=\"0.5\"} 12",
        "latency_count 1",
        "bytes_sum 150",
        "bytes_count 2",
        "bytes_stats{stat=\"windows\"} 1",
    ];
    for line in expected {
        if !output.lines().any(|candidate| candidate == line) {
            return Err(AppError::export(format!(
                "Missing line '{}' in:\n{}",
                line, output
            )));
        }
    }
    Ok(())
}

#[test]
fn prometheus_families_stay_unique_when_kinds_share_a_name() -> AppResult<()> {
    let at = Utc
        .with_ymd_and_hms(2024, 1, 2, 3, 4, 5)
        .single()
        .ok_or_else(|| AppError::export("invalid fixture time"))?;
    let mut tables = AggregateTables::new(Resolution::Second);
    let measurements = [
        Measurement::counter("jobs", 4.0)?,
        Measurement::gauge("jobs", 2.0)?,
        Measurement::histogram("latency", 5.0)?,
        Measurement::summary("latency", 9.0)?,
        Measurement::gauge("depth", 1.0)?,
    ];
    for measurement in measurements {
        tables.record(measurement.with_timestamp(at), at);
    }
    let output = render_prometheus(&tables.into_snapshot(1, at))?;

    let mut families: Vec<&str> = output
        .lines()
        .filter_map(|line| line.strip_prefix("# TYPE "))
        .filter_map(|line| line.split(' ').next())
        .collect();
    let total = families.len();
    families.sort_unstable();
    families.dedup();
    if families.len() != total {
        return Err(AppError::export(format!(
            "Duplicate families in:\n{}",
            output
        )));
    }

    let expected = [
        "# TYPE jobs_counter counter",
        "jobs_counter 4",
        "# TYPE jobs_gauge gauge",
        "jobs_gauge 2",
        "# TYPE latency_histogram summary",
        "# TYPE latency_summary summary",
        "latency_summary_sum 9",
        "# TYPE depth gauge",
        "depth 1",
    ];
    for line in expected {
        if !output.lines().any(|candidate| candidate == line) {
            return Err(AppError::export(format!(
                "Missing line '{}' in:\n{}",
                line, output
            )));
        }
    }
    Ok(())
}

#[test]
fn influx_output_escapes_tags_and_stamps_lines() -> AppResult<()> {
    let snapshot = sample_snapshot()?;
    let output = render_influx(&snapshot)?;
    let nanos = snapshot
        .flushed_at
        .and_then(|at| at.timestamp_nanos_opt())
        .ok_or_else(|| AppError::export("missing flush time"))?;

    if output.lines().count() != snapshot.len() {
        return Err(AppError::export(format!(
            "Expected {} lines, got:\n{}",
            snapshot.len(),
            output
        )));
    }
    let counter_line = output
        .lines()
        .find(|line| line.starts_with("http.requests,"))
        .ok_or_else(|| AppError::export("Missing counter line"))?;
    let expected_prefix = "http.requests,kind=counter,route=/a\\ b value=5,count=2i";
    if !counter_line.starts_with(expected_prefix) {
        return Err(AppError::export(format!(
            "Unexpected counter line: {}",
            counter_line
        )));
    }
    if !counter_line.ends_with(&format!(" {}", nanos)) {
        return Err(AppError::export("Counter line is missing its timestamp"));
    }
    Ok(())
}

#[test]
fn otel_payload_carries_all_metrics() -> AppResult<()> {
    let payload = render_otel(&sample_snapshot()?);
    let metrics = payload
        .get("metrics")
        .and_then(|metrics| metrics.as_array())
        .ok_or_else(|| AppError::export("Missing metrics array"))?;
    if metrics.len() != 4 {
        return Err(AppError::export(format!(
            "Expected 4 metrics, got {}",
            metrics.len()
        )));
    }
    let sequence = payload.get("sequence").and_then(serde_json::Value::as_u64);
    if sequence != Some(4) {
        return Err(AppError::export(format!("Unexpected sequence {:?}", sequence)));
    }
    Ok(())
}

#[test]
fn console_render_is_valid_json() -> AppResult<()> {
    let rendered = ConsoleExporter::render(&sample_snapshot()?)?;
    let parsed: serde_json::Value = serde_json::from_str(&rendered)
        .map_err(|err| AppError::export(format!("Invalid JSON: {}", err)))?;
    let clicks = parsed
        .get("counters")
        .and_then(|counters| counters.get("http.requests"))
        .and_then(|counter| counter.get("value"))
        .and_then(serde_json::Value::as_f64);
    if clicks.is_some_and(|value| (value - 5.0).abs() < f64::EPSILON) {
        Ok(())
    } else {
        Err(AppError::export(format!("Unexpected counter value {:?}", clicks)))
    }
}

#[test]
fn fanout_attempts_every_exporter_and_reports_first_error() -> AppResult<()> {
    run_async_test(async {
        let calls = Arc::new(AtomicUsize::new(0));
        let first_calls = Arc::clone(&calls);
        let last_calls = Arc::clone(&calls);
        let fanout = FanoutExporter::new()
            .with(FnExporter::new("failing", move |_snapshot: &Snapshot| {
                first_calls.fetch_add(1, Ordering::SeqCst);
                Err(ExportError::message("first failure"))
            }))
            .with(NoopExporter)
            .with(FnExporter::new("counting", move |_snapshot: &Snapshot| {
                last_calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }));

        let result = fanout.export(&Snapshot::default()).await;
        match result {
            Err(ExportError::Message { message }) if message == "first failure" => {}
            other => {
                return Err(AppError::export(format!(
                    "Expected first failure, got {:?}",
                    other
                )));
            }
        }
        if calls.load(Ordering::SeqCst) != 2 {
            return Err(AppError::export("Not every exporter ran"));
        }
        Ok(())
    })
}

#[test]
fn prometheus_exporter_writes_file() -> AppResult<()> {
    run_async_test(async {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("metrics.prom");
        let exporter = PrometheusExporter::new(path.to_string_lossy().into_owned());
        exporter.export(&sample_snapshot()?).await?;

        let content = tokio::fs::read_to_string(&path).await?;
        if content.contains("# TYPE queue_depth gauge") {
            Ok(())
        } else {
            Err(AppError::export(format!("Unexpected file content:\n{}", content)))
        }
    })
}

#[test]
fn write_failure_surfaces_path() -> AppResult<()> {
    run_async_test(async {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("missing").join("metrics.prom");
        let exporter = PrometheusExporter::new(path.to_string_lossy().into_owned());
        match exporter.export(&Snapshot::default()).await {
            Err(ExportError::Write { exporter, .. }) if exporter == "prometheus" => Ok(()),
            other => Err(AppError::export(format!(
                "Expected write error, got {:?}",
                other
            ))),
        }
    })
}

#[test]
fn sinks_config_builds_requested_exporters() -> AppResult<()> {
    let config: SinksConfig = toml::from_str(
        r#"
console = false

[prometheus]
path = "out.prom"

[influx]
path = "out.influx"
"#,
    )
    .map_err(|err| AppError::export(format!("parse failed: {}", err)))?;
    let names: Vec<&str> = config.build().names().collect();
    if names == ["prometheus", "influx"] {
        Ok(())
    } else {
        Err(AppError::export(format!("Unexpected exporters {:?}", names)))
    }
}

#[test]
fn default_sinks_print_to_console() -> AppResult<()> {
    let names: Vec<&str> = SinksConfig::default().build().names().collect();
    if names == ["console"] {
        Ok(())
    } else {
        Err(AppError::export(format!("Unexpected exporters {:?}", names)))
    }
}
