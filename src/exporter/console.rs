use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

use super::Exporter;
use crate::error::ExportError;
use crate::snapshot::Snapshot;

/// Prints each snapshot to stdout as indented JSON.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleExporter;

impl ConsoleExporter {
    /// # Errors
    ///
    /// Returns an error if the snapshot cannot be serialized.
    pub fn render(snapshot: &Snapshot) -> Result<String, ExportError> {
        serde_json::to_string_pretty(snapshot).map_err(|err| ExportError::Serialize {
            exporter: "console",
            source: err,
        })
    }
}

#[async_trait]
impl Exporter for ConsoleExporter {
    fn name(&self) -> &'static str {
        "console"
    }

    async fn export(&self, snapshot: &Snapshot) -> Result<(), ExportError> {
        let mut rendered = Self::render(snapshot)?;
        rendered.push('\n');
        let mut stdout = tokio::io::stdout();
        stdout
            .write_all(rendered.as_bytes())
            .await
            .map_err(|err| ExportError::Stdout { source: err })?;
        stdout
            .flush()
            .await
            .map_err(|err| ExportError::Stdout { source: err })
    }
}
