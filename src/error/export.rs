use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to write line: {source}")]
    WriteLine {
        #[source]
        source: std::fmt::Error,
    },
    #[error("Failed to serialize snapshot for {exporter}: {source}")]
    Serialize {
        exporter: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("Failed to write {exporter} output '{path}': {source}")]
    Write {
        exporter: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to write to stdout: {source}")]
    Stdout {
        #[source]
        source: std::io::Error,
    },
    #[error("Export did not finish within {timeout:?}.")]
    TimedOut { timeout: Duration },
    #[error("{message}")]
    Message { message: String },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}

impl ExportError {
    pub fn message<S>(message: S) -> Self
    where
        S: Into<String>,
    {
        ExportError::Message {
            message: message.into(),
        }
    }
}
