use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::{Instant, MissedTickBehavior};

use super::config::{ProcessorConfig, ProcessorState, StopPolicy};
use crate::aggregate::AggregateTables;
use crate::error::ExportError;
use crate::exporter::Exporter;
use crate::measurement::Measurement;
use crate::shutdown::ShutdownReceiver;
use crate::snapshot::Snapshot;

/// How far out the first tick lands when the interval does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Requests the owning handle can make of a running loop.
pub(super) enum Control {
    Flush(oneshot::Sender<Arc<Snapshot>>),
}

/// The single owner of the aggregate tables.
pub(super) struct EventLoop {
    tables: AggregateTables,
    exporter: Box<dyn Exporter>,
    export_interval: Duration,
    export_timeout: Option<Duration>,
    queue_capacity: usize,
    on_stop: StopPolicy,
    sequence: u64,
    last_export_error: Option<String>,
    snapshot_tx: watch::Sender<Arc<Snapshot>>,
    state_tx: watch::Sender<ProcessorState>,
}

pub(super) struct LoopChannels {
    pub(super) measurements: mpsc::Receiver<Measurement>,
    pub(super) control: mpsc::Receiver<Control>,
    pub(super) shutdown: ShutdownReceiver,
}

impl EventLoop {
    pub(super) fn new(
        config: &ProcessorConfig,
        exporter: Box<dyn Exporter>,
        snapshot_tx: watch::Sender<Arc<Snapshot>>,
        state_tx: watch::Sender<ProcessorState>,
    ) -> Self {
        Self {
            tables: AggregateTables::new(config.resolution),
            exporter,
            export_interval: config.export_interval,
            export_timeout: config.export_timeout,
            queue_capacity: config.queue_capacity,
            on_stop: config.on_stop,
            sequence: 0,
            last_export_error: None,
            snapshot_tx,
            state_tx,
        }
    }

    pub(super) async fn run(mut self, channels: LoopChannels) {
        let LoopChannels {
            mut measurements,
            mut control,
            mut shutdown,
        } = channels;

        self.state_tx.send_replace(ProcessorState::Running);
        tracing::debug!(
            "Processor loop running (interval {:?}, exporter '{}')",
            self.export_interval,
            self.exporter.name()
        );

        let mut ticker = tokio::time::interval_at(
            first_tick(Instant::now(), self.export_interval),
            self.export_interval,
        );
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => break,
                Some(Control::Flush(reply)) = control.recv() => {
                    self.drain_pending(&mut measurements);
                    let snapshot = self.flush().await;
                    drop(reply.send(snapshot));
                }
                _ = ticker.tick() => {
                    self.flush().await;
                }
                maybe_measurement = measurements.recv() => {
                    match maybe_measurement {
                        Some(measurement) => self.tables.record(measurement, Utc::now()),
                        None => break,
                    }
                }
            }
        }

        self.state_tx.send_replace(ProcessorState::Stopping);
        measurements.close();
        control.close();
        while let Some(measurement) = measurements.recv().await {
            self.tables.record(measurement, Utc::now());
        }

        match self.on_stop {
            StopPolicy::Flush => {
                self.flush().await;
            }
            StopPolicy::Discard => {
                let discarded = self.tables.detach();
                tracing::debug!(
                    "Discarding {} aggregates ({} samples) on stop",
                    discarded.len(),
                    discarded.samples()
                );
            }
        }

        // Pending flush requests are answered with whatever is current.
        while let Ok(Control::Flush(reply)) = control.try_recv() {
            drop(reply.send(Arc::clone(&self.snapshot_tx.borrow())));
        }

        self.state_tx.send_replace(ProcessorState::Stopped);
        tracing::debug!("Processor loop stopped after {} flushes", self.sequence);
    }

    /// Folds what is already queued, bounded by the queue size so a busy
    /// producer cannot hold the flush back.
    fn drain_pending(&mut self, measurements: &mut mpsc::Receiver<Measurement>) {
        let mut drained = 0_usize;
        while drained < self.queue_capacity {
            match measurements.try_recv() {
                Ok(measurement) => {
                    self.tables.record(measurement, Utc::now());
                    drained = drained.saturating_add(1);
                }
                Err(_) => break,
            }
        }
    }

    async fn flush(&mut self) -> Arc<Snapshot> {
        let tables = self.tables.detach();
        let samples = tables.samples();
        self.sequence = self.sequence.saturating_add(1);
        let snapshot = Arc::new(tables.into_snapshot(self.sequence, Utc::now()));
        tracing::debug!(
            "Flush #{}: {} aggregates from {} samples",
            snapshot.sequence,
            snapshot.len(),
            samples
        );

        self.export(&snapshot).await;
        self.snapshot_tx.send_replace(Arc::clone(&snapshot));
        snapshot
    }

    async fn export(&mut self, snapshot: &Snapshot) {
        let outcome = match self.export_timeout {
            Some(timeout) => {
                match tokio::time::timeout(timeout, self.exporter.export(snapshot)).await {
                    Ok(result) => result,
                    Err(_elapsed) => Err(ExportError::TimedOut { timeout }),
                }
            }
            None => self.exporter.export(snapshot).await,
        };

        match outcome {
            Ok(()) => {
                if self.last_export_error.take().is_some() {
                    tracing::info!("Exporter '{}' recovered", self.exporter.name());
                }
            }
            Err(err) => {
                let message = err.to_string();
                if self.last_export_error.as_deref() != Some(message.as_str()) {
                    tracing::warn!(
                        "Exporter '{}' failed on flush #{}: {}",
                        self.exporter.name(),
                        snapshot.sequence,
                        message
                    );
                    self.last_export_error = Some(message);
                }
            }
        }
    }
}

/// Deadline of the first export tick, clamped for intervals past the clock's range.
pub(super) fn first_tick(now: Instant, interval: Duration) -> Instant {
    now.checked_add(interval)
        .or_else(|| now.checked_add(FAR_FUTURE))
        .unwrap_or(now)
}
