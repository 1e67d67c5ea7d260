use async_trait::async_trait;

use super::Exporter;
use crate::error::ExportError;
use crate::snapshot::Snapshot;

/// Runs several exporters in order against the same snapshot.
///
/// Every exporter is attempted even if an earlier one fails; the first
/// failure is returned once all have run.
#[derive(Default)]
pub struct FanoutExporter {
    exporters: Vec<Box<dyn Exporter>>,
}

impl FanoutExporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with<E>(mut self, exporter: E) -> Self
    where
        E: Exporter + 'static,
    {
        self.exporters.push(Box::new(exporter));
        self
    }

    pub fn push(&mut self, exporter: Box<dyn Exporter>) {
        self.exporters.push(exporter);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.exporters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.exporters.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> {
        self.exporters.iter().map(|exporter| exporter.name())
    }
}

#[async_trait]
impl Exporter for FanoutExporter {
    fn name(&self) -> &'static str {
        "fanout"
    }

    async fn export(&self, snapshot: &Snapshot) -> Result<(), ExportError> {
        let mut first_error = None;
        for exporter in &self.exporters {
            if let Err(err) = exporter.export(snapshot).await {
                tracing::debug!("Exporter '{}' failed: {}", exporter.name(), err);
                if first_error.is_none() {
                    first_error = Some(err);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
