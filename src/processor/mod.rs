//! The aggregation processor: a single tokio task that owns the aggregate
//! tables, folds queued measurements and flushes them to an exporter.
mod config;
mod event_loop;
mod sender;


use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use crate::error::ProcessorError;
use crate::exporter::Exporter;
use crate::measurement::Measurement;
use crate::shutdown::{ShutdownSender, shutdown_channel};
use crate::snapshot::Snapshot;

pub use config::{
    DEFAULT_EXPORT_INTERVAL, DEFAULT_QUEUE_CAPACITY, OverflowPolicy, ProcessorConfig,
    ProcessorState, StopPolicy,
};
pub use sender::MetricSender;

use event_loop::{Control, EventLoop, LoopChannels};

/// Control requests are rare; a handful of slots is plenty.
const CONTROL_CHANNEL_CAPACITY: usize = 8;

/// Handle to a running aggregation loop.
///
/// Dropping the handle without calling [`Processor::stop`] closes the
/// shutdown channel, which the loop treats as a stop request.
pub struct Processor {
    sender: MetricSender,
    control_tx: mpsc::Sender<Control>,
    shutdown_tx: ShutdownSender,
    snapshot_rx: watch::Receiver<Arc<Snapshot>>,
    state_rx: watch::Receiver<ProcessorState>,
    handle: JoinHandle<()>,
}

impl Processor {
    /// Spawns the aggregation loop on the current tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `ProcessorError::InvalidConfig` when the configuration is
    /// unusable and `ProcessorError::NoRuntime` outside a tokio runtime.
    pub fn start<E>(config: ProcessorConfig, exporter: E) -> Result<Self, ProcessorError>
    where
        E: Exporter + 'static,
    {
        config.validate()?;
        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_err| ProcessorError::NoRuntime)?;

        let (measurement_tx, measurement_rx) = mpsc::channel(config.queue_capacity);
        let (control_tx, control_rx) = mpsc::channel(CONTROL_CHANNEL_CAPACITY);
        let (shutdown_tx, shutdown_rx) = shutdown_channel();
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(Snapshot::default()));
        let (state_tx, state_rx) = watch::channel(ProcessorState::Created);

        let sender = MetricSender::new(measurement_tx, config.overflow);
        let event_loop = EventLoop::new(&config, Box::new(exporter), snapshot_tx, state_tx);
        let handle = runtime.spawn(event_loop.run(LoopChannels {
            measurements: measurement_rx,
            control: control_rx,
            shutdown: shutdown_rx,
        }));

        tracing::debug!(
            "Started processor (interval {:?}, capacity {}, resolution {}, overflow {}, on stop {})",
            config.export_interval,
            config.queue_capacity,
            config.resolution,
            config.overflow,
            config.on_stop
        );

        Ok(Self {
            sender,
            control_tx,
            shutdown_tx,
            snapshot_rx,
            state_rx,
            handle,
        })
    }

    /// Enqueues a measurement for the loop.
    ///
    /// # Errors
    ///
    /// Returns `ProcessorError::Stopped` once the loop no longer accepts
    /// measurements.
    pub async fn send(&self, measurement: Measurement) -> Result<(), ProcessorError> {
        self.sender.send(measurement).await
    }

    /// Enqueues a measurement from a thread that is not running async code.
    ///
    /// # Errors
    ///
    /// Returns `ProcessorError::Stopped` once the loop is gone and
    /// `ProcessorError::BlockingInRuntime` when called from async context.
    pub fn send_blocking(&self, measurement: Measurement) -> Result<(), ProcessorError> {
        self.sender.send_blocking(measurement)
    }

    /// Cloneable producer handle.
    #[must_use]
    pub fn sender(&self) -> MetricSender {
        self.sender.clone()
    }

    /// Measurements discarded by the `drop` overflow policy so far.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.sender.dropped()
    }

    /// Drains the queue and runs a flush cycle now.
    ///
    /// # Errors
    ///
    /// Returns `ProcessorError::Stopped` if the loop has exited and
    /// `ProcessorError::FlushReplyLost` if it exits before replying.
    pub async fn flush(&self) -> Result<Arc<Snapshot>, ProcessorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.control_tx
            .send(Control::Flush(reply_tx))
            .await
            .map_err(|_err| ProcessorError::Stopped)?;
        reply_rx.await.map_err(|_err| ProcessorError::FlushReplyLost)
    }

    /// Latest completed snapshot; empty before the first flush.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot_rx.borrow())
    }

    /// Receiver that observes every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.snapshot_rx.clone()
    }

    #[must_use]
    pub fn state(&self) -> ProcessorState {
        *self.state_rx.borrow()
    }

    /// Signals the loop, waits for it to drain and finish, and returns the
    /// last snapshot it published.
    ///
    /// # Errors
    ///
    /// Returns `ProcessorError::Join` if the loop task panicked or was
    /// cancelled.
    pub async fn stop(self) -> Result<Arc<Snapshot>, ProcessorError> {
        let Processor {
            sender,
            control_tx,
            shutdown_tx,
            snapshot_rx,
            state_rx,
            handle,
        } = self;

        drop(shutdown_tx.send(()));
        drop(control_tx);
        drop(sender);
        handle
            .await
            .map_err(|source| ProcessorError::Join { source })?;

        tracing::debug!("Processor {}", *state_rx.borrow());
        let latest = Arc::clone(&snapshot_rx.borrow());
        Ok(latest)
    }
}
