//! Temporal window selecting which labels feed a run.

use crate::error::{TrainingError, TrainingResult};
use chrono::{Month, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Half-open date range `[start, end)`.
///
/// `start` is the first day of `start_month` in year
/// `up_to_year - ceil(input_months / 12)`; `end` is `input_months` later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl TimeWindow {
    pub fn new(up_to_year: i32, start_month: Month, input_months: u32) -> TrainingResult<Self> {
        if input_months == 0 {
            return Err(TrainingError::config("input_months must be >= 1"));
        }
        let years_back = i32::try_from(input_months.div_ceil(12))
            .map_err(|_| TrainingError::config(format!("input_months {input_months} is too large")))?;

        let start = up_to_year
            .checked_sub(years_back)
            .and_then(|year| NaiveDate::from_ymd_opt(year, start_month.number_from_month(), 1))
            .ok_or_else(|| TrainingError::config(format!("up_to_year {up_to_year} is out of range")))?;
        let end = start
            .checked_add_months(Months::new(input_months))
            .ok_or_else(|| TrainingError::config(format!("input_months {input_months} is out of range")))?;

        Ok(Self { start, end })
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    /// First day after the window.
    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    /// Whether the inclusive range `[first, last]` shares any day with the window.
    #[must_use]
    pub fn overlaps(&self, first: NaiveDate, last: NaiveDate) -> bool {
        first < self.end && last >= self.start
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

/// Parse a month name ("February", "feb", ...).
pub fn parse_month(name: &str) -> TrainingResult<Month> {
    name.trim()
        .parse::<Month>()
        .map_err(|_| TrainingError::config(format!("start_month '{name}' is not a month name")))
}
