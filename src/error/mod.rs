mod app;
mod config;
mod export;
mod processor;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use export::ExportError;
pub use processor::ProcessorError;
pub use validation::ValidationError;
