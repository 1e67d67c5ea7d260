use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Metric name must not be empty.")]
    EmptyMetricName,
    #[error("Metric '{name}' has a non-finite value ({value}).")]
    NonFiniteValue { name: String, value: f64 },
    #[error("Unknown metric kind '{value}'. Use counter, gauge, histogram, or summary.")]
    UnknownMetricKind { value: String },
    #[error("Unknown resolution '{value}'. Use second, minute, hour, or day.")]
    UnknownResolution { value: String },
    #[error("Unknown overflow policy '{value}'. Use block or drop.")]
    UnknownOverflowPolicy { value: String },
    #[error("Unknown stop policy '{value}'. Use flush or discard.")]
    UnknownStopPolicy { value: String },
    #[error("Duration must not be empty.")]
    DurationEmpty,
    #[error("Invalid duration '{value}'.")]
    InvalidDurationFormat { value: String },
    #[error("Invalid duration '{value}': {source}")]
    InvalidDurationNumber {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Duration overflow.")]
    DurationOverflow,
    #[error("Invalid duration unit '{unit}'.")]
    InvalidDurationUnit { unit: String },
    #[error("Duration must be > 0.")]
    DurationZero,
    #[error("Invalid boolean '{value}'. Use true/false, yes/no, on/off or 1/0.")]
    InvalidBoolean { value: String },
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Invalid value: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
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
