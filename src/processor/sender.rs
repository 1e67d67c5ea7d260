use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::config::OverflowPolicy;
use crate::error::ProcessorError;
use crate::measurement::Measurement;

/// Producer side of a processor's measurement queue.
#[derive(Debug, Clone)]
pub struct MetricSender {
    tx: mpsc::Sender<Measurement>,
    overflow: OverflowPolicy,
    dropped: Arc<AtomicU64>,
}

impl MetricSender {
    pub(super) fn new(tx: mpsc::Sender<Measurement>, overflow: OverflowPolicy) -> Self {
        Self {
            tx,
            overflow,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Enqueues a measurement, honouring the overflow policy.
    ///
    /// # Errors
    ///
    /// Returns `ProcessorError::Stopped` once the queue is closed.
    pub async fn send(&self, measurement: Measurement) -> Result<(), ProcessorError> {
        match self.overflow {
            OverflowPolicy::Block => self
                .tx
                .send(measurement)
                .await
                .map_err(|_err| ProcessorError::Stopped),
            OverflowPolicy::Drop => self.try_enqueue(measurement),
        }
    }

    /// Blocking variant of [`MetricSender::send`] for plain threads.
    ///
    /// # Errors
    ///
    /// Returns `ProcessorError::BlockingInRuntime` when called from inside a
    /// tokio runtime and `ProcessorError::Stopped` once the queue is closed.
    pub fn send_blocking(&self, measurement: Measurement) -> Result<(), ProcessorError> {
        if tokio::runtime::Handle::try_current().is_ok() {
            return Err(ProcessorError::BlockingInRuntime);
        }
        match self.overflow {
            OverflowPolicy::Block => self
                .tx
                .blocking_send(measurement)
                .map_err(|_err| ProcessorError::Stopped),
            OverflowPolicy::Drop => self.try_enqueue(measurement),
        }
    }

    fn try_enqueue(&self, measurement: Measurement) -> Result<(), ProcessorError> {
        match self.tx.try_send(measurement) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(measurement)) => {
                let dropped = self.dropped.fetch_add(1, Ordering::Relaxed).saturating_add(1);
                tracing::debug!(
                    "Queue full, dropped '{}' ({} dropped so far)",
                    measurement.name(),
                    dropped
                );
                Ok(())
            }
            Err(TrySendError::Closed(_)) => Err(ProcessorError::Stopped),
        }
    }

    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
