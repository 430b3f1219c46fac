use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

use crate::commands::base_commands::PeriodArgs;
use crate::domain::period::{Period, end_of_day};
use crate::services::config::ConfigError;
use crate::services::report::AnalyticsError;
use crate::services::task_yaml::{TaskYamlError, parse_timestamp};
use crate::services::trend_store::TrendStoreError;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("failed to load analytics config: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to load tasks: {0}")]
    Tasks(#[from] TaskYamlError),
    #[error("invalid date: {0}")]
    InvalidDate(String),
    #[error("analytics request failed: {0}")]
    Analytics(#[from] AnalyticsError),
    #[error("trend store error: {0}")]
    TrendStore(#[from] TrendStoreError),
    #[error("failed to serialize output: {0}")]
    Serialize(String),
    #[error("failed to write output file: {0}")]
    Write(#[from] std::io::Error),
}

/// Parses a period boundary. A bare end date covers that whole day.
fn parse_boundary(text: &str, is_end: bool) -> Result<DateTime<Utc>, CommandError> {
    if is_end {
        if let Ok(date) = NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d") {
            return Ok(end_of_day(date));
        }
    }
    parse_timestamp(text).map_err(|_| CommandError::InvalidDate(text.to_string()))
}

pub fn parse_period(args: &PeriodArgs) -> Result<(Period, DateTime<Utc>), CommandError> {
    let start = parse_boundary(&args.start, false)?;
    let end = parse_boundary(&args.end, true)?;
    if start > end {
        return Err(CommandError::InvalidDate(format!(
            "period start {} is after end {}",
            args.start, args.end
        )));
    }
    let now = match &args.now {
        Some(text) => parse_boundary(text, false)?,
        None => Utc::now(),
    };
    Ok((Period::new(start, end), now))
}

/// Identity handed to the access policy for local runs.
pub fn local_caller() -> String {
    std::env::var("USER").unwrap_or_else(|_| "local".to_string())
}
