//! Exporter capability consumed by the processor, plus the exporters that
//! ship with the crate.
//!
//! The processor calls [`Exporter::export`] once per flush and only logs a
//! failure; an exporter never affects aggregation.
mod config;
mod console;
mod fanout;
mod format;
mod writers;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ExportError;
use crate::snapshot::Snapshot;

pub use config::{InfluxSinkConfig, OtelSinkConfig, PrometheusSinkConfig, SinksConfig};
pub use console::ConsoleExporter;
pub use fanout::FanoutExporter;
pub use writers::{InfluxExporter, OtelJsonExporter, PrometheusExporter};

#[async_trait]
pub trait Exporter: Send + Sync {
    /// Short label used in log lines.
    fn name(&self) -> &'static str;

    /// Publishes one snapshot. The snapshot must be treated as read-only.
    ///
    /// # Errors
    ///
    /// Returns an error when the snapshot cannot be rendered or delivered.
    async fn export(&self, snapshot: &Snapshot) -> Result<(), ExportError>;
}

#[async_trait]
impl<E> Exporter for Arc<E>
where
    E: Exporter + ?Sized,
{
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn export(&self, snapshot: &Snapshot) -> Result<(), ExportError> {
        (**self).export(snapshot).await
    }
}

#[async_trait]
impl<E> Exporter for Box<E>
where
    E: Exporter + ?Sized,
{
    fn name(&self) -> &'static str {
        (**self).name()
    }

    async fn export(&self, snapshot: &Snapshot) -> Result<(), ExportError> {
        (**self).export(snapshot).await
    }
}

/// Adapts a plain synchronous function into an [`Exporter`].
pub struct FnExporter<F> {
    name: &'static str,
    func: F,
}

impl<F> FnExporter<F>
where
    F: Fn(&Snapshot) -> Result<(), ExportError> + Send + Sync,
{
    #[must_use]
    pub const fn new(name: &'static str, func: F) -> Self {
        Self { name, func }
    }
}

#[async_trait]
impl<F> Exporter for FnExporter<F>
where
    F: Fn(&Snapshot) -> Result<(), ExportError> + Send + Sync,
{
    fn name(&self) -> &'static str {
        self.name
    }

    async fn export(&self, snapshot: &Snapshot) -> Result<(), ExportError> {
        (self.func)(snapshot)
    }
}

/// Exporter that accepts every snapshot and does nothing with it. Useful
/// when only [`crate::processor::Processor::snapshot`] is consumed.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopExporter;

#[async_trait]
impl Exporter for NoopExporter {
    fn name(&self) -> &'static str {
        "noop"
    }

    async fn export(&self, _snapshot: &Snapshot) -> Result<(), ExportError> {
        Ok(())
    }
}
