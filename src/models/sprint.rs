use crate::analysis::BurndownError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprint {
    pub name: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default)]
    pub demo: Option<NaiveDate>,
    #[serde(default)]
    pub goal: Option<String>,
}

impl Sprint {
    pub fn cycle(&self, include_weekends: bool) -> Result<Cycle, BurndownError> {
        Cycle::new(self.start, self.end, include_weekends)
    }
}

/// The sprint window a burndown is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cycle {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub include_weekends: bool,
}

impl Cycle {
    pub fn new(start: NaiveDate, end: NaiveDate, include_weekends: bool) -> Result<Self, BurndownError> {
        if end < start {
            return Err(BurndownError::MalformedCycle { start, end });
        }
        Ok(Self {
            start,
            end,
            include_weekends,
        })
    }

    /// Last day on which work is expected; the end day itself only shows the final value.
    pub fn last_full_day(&self) -> NaiveDate {
        self.end.pred_opt().unwrap_or(self.end)
    }
}
