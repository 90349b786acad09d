use chrono::NaiveDate;
use thiserror::Error;

/// Conditions under which no meaningful burndown can be computed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BurndownError {
    #[error("Invalid cycle bounds: end {end} is before start {start}")]
    MalformedCycle { start: NaiveDate, end: NaiveDate },

    #[error("Cannot derive an ideal slope: cycle from {start} to {end} has no working weekdays")]
    DivideByZeroWeekdays { start: NaiveDate, end: NaiveDate },
}
