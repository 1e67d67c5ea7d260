use std::time::Duration;

use super::types::{PositiveU64, PositiveUsize};
use crate::config::parse_duration_value;
use crate::error::{AppError, AppResult, ValidationError};
use crate::measurement::Resolution;
use crate::processor::{OverflowPolicy, StopPolicy};

pub(super) fn parse_positive_u64(s: &str) -> AppResult<PositiveU64> {
    s.parse::<PositiveU64>().map_err(AppError::from)
}

pub(super) fn parse_positive_usize(s: &str) -> AppResult<PositiveUsize> {
    s.parse::<PositiveUsize>().map_err(AppError::from)
}

pub(crate) fn parse_duration_arg(s: &str) -> AppResult<Duration> {
    parse_duration_value(s).map_err(AppError::from)
}

pub(super) fn parse_resolution(s: &str) -> AppResult<Resolution> {
    s.parse::<Resolution>().map_err(AppError::from)
}

pub(super) fn parse_overflow(s: &str) -> AppResult<OverflowPolicy> {
    s.parse::<OverflowPolicy>().map_err(AppError::from)
}

pub(super) fn parse_stop_policy(s: &str) -> AppResult<StopPolicy> {
    s.parse::<StopPolicy>().map_err(AppError::from)
}

pub(crate) fn parse_bool_env(s: &str) -> AppResult<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "no" | "n" | "off" => Ok(false),
        _ => Err(AppError::validation(ValidationError::InvalidBoolean {
            value: s.to_owned(),
        })),
    }
}
