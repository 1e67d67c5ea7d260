use std::time::Duration;

use rand::Rng;
use rand::thread_rng;
use tokio::time::MissedTickBehavior;

use crate::error::{AppResult, ValidationError};
use crate::measurement::{Measurement, MetricKind, Tags};
use crate::processor::MetricSender;
use crate::shutdown::ShutdownReceiver;

/// Series emitted once per round: a fixed and a varying value per kind.
pub const TESTER_SERIES: [(&str, MetricKind); 8] = [
    ("counter.fixed", MetricKind::Counter),
    ("counter.var", MetricKind::Counter),
    ("gauge.fixed", MetricKind::Gauge),
    ("gauge.var", MetricKind::Gauge),
    ("histogram.fixed", MetricKind::Histogram),
    ("histogram.var", MetricKind::Histogram),
    ("summary.fixed", MetricKind::Summary),
    ("summary.var", MetricKind::Summary),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkloadPlan {
    /// Rounds per second.
    pub rate: u64,
    pub duration: Duration,
}

impl WorkloadPlan {
    fn round_interval(&self) -> Duration {
        Duration::from_secs(1)
            .checked_div(u32::try_from(self.rate).unwrap_or(u32::MAX))
            .unwrap_or(Duration::from_secs(1))
            .max(Duration::from_micros(1))
    }
}

fn fixed_value(kind: MetricKind) -> f64 {
    match kind {
        MetricKind::Counter => 1.0,
        MetricKind::Gauge => 5.0,
        MetricKind::Histogram | MetricKind::Summary => 2.0,
    }
}

fn tester_tags() -> Tags {
    Tags::from([
        ("tag1".to_owned(), "value1".to_owned()),
        ("tag2".to_owned(), "value2".to_owned()),
    ])
}

/// One measurement per tester series. `*.var` series draw from `0..10`;
/// gauges carry no tags.
///
/// # Errors
///
/// Never fails for the built-in series; the error is the factory's.
pub fn tester_round() -> Result<Vec<Measurement>, ValidationError> {
    let mut rng = thread_rng();
    let mut round = Vec::with_capacity(TESTER_SERIES.len());
    for (name, kind) in TESTER_SERIES {
        let value = if name.ends_with(".var") {
            f64::from(rng.gen_range(0_u8..10))
        } else {
            fixed_value(kind)
        };
        let tags = (kind != MetricKind::Gauge).then(tester_tags);
        round.push(Measurement::new(name, kind, tags, value)?);
    }
    Ok(round)
}

/// Sends tester rounds until the plan's duration elapses or shutdown is
/// signalled. Returns the number of measurements handed to the sender.
///
/// # Errors
///
/// Returns an error if a round cannot be built or the processor stops
/// accepting measurements.
pub async fn run_workload(
    sender: MetricSender,
    plan: WorkloadPlan,
    mut shutdown_rx: ShutdownReceiver,
) -> AppResult<u64> {
    let mut ticker = tokio::time::interval(plan.round_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let deadline = tokio::time::sleep(plan.duration);
    tokio::pin!(deadline);
    let mut sent = 0_u64;

    loop {
        tokio::select! {
            biased;
            _ = shutdown_rx.recv() => break,
            () = &mut deadline => break,
            _ = ticker.tick() => {
                for measurement in tester_round()? {
                    sender.send(measurement).await?;
                    sent = sent.saturating_add(1);
                }
            }
        }
    }

    tracing::debug!("Workload finished after {} measurements", sent);
    Ok(sent)
}
