use thiserror::Error;

use super::ValidationError;

#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Processor is stopped; measurement rejected.")]
    Stopped,
    #[error("Processor loop ended before answering the flush request.")]
    FlushReplyLost,
    #[error("Processor loop failed: {source}")]
    Join {
        #[source]
        source: tokio::task::JoinError,
    },
    #[error("Blocking send called from inside an async runtime.")]
    BlockingInRuntime,
    #[error("Processor must be started from inside a tokio runtime.")]
    NoRuntime,
    #[error("Invalid processor configuration for '{field}': {source}")]
    InvalidConfig {
        field: &'static str,
        #[source]
        source: ValidationError,
    },
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
