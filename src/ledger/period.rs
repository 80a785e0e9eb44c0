//! Billing-period identity: one key per card statement cycle.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Identifies one billing cycle by the year-month of its closing date.
///
/// Keys order chronologically and render as `"YYYY-MM"`, the form the
/// document store indexes invoices by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PeriodKey {
    year: i32,
    month: u32,
}

impl PeriodKey {
    /// Builds a key from explicit parts. Months outside 1..=12 are rejected.
    pub fn from_parts(year: i32, month: u32) -> Result<Self, PeriodKeyError> {
        if !(1..=12).contains(&month) {
            return Err(PeriodKeyError::MonthOutOfRange(month));
        }
        Ok(Self { year, month })
    }

    /// The key of the calendar month containing `date`.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The immediately following period.
    pub fn next(self) -> Self {
        if self.month == 12 {
            Self {
                year: self.year + 1,
                month: 1,
            }
        } else {
            Self {
                year: self.year,
                month: self.month + 1,
            }
        }
    }

    /// The immediately preceding period.
    pub fn prev(self) -> Self {
        if self.month == 1 {
            Self {
                year: self.year - 1,
                month: 12,
            }
        } else {
            Self {
                year: self.year,
                month: self.month - 1,
            }
        }
    }
}

impl fmt::Display for PeriodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PeriodKey {
    type Err = PeriodKeyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (year, month) = value
            .split_once('-')
            .ok_or_else(|| PeriodKeyError::Malformed(value.to_string()))?;
        let year: i32 = year
            .parse()
            .map_err(|_| PeriodKeyError::Malformed(value.to_string()))?;
        let month: u32 = month
            .parse()
            .map_err(|_| PeriodKeyError::Malformed(value.to_string()))?;
        Self::from_parts(year, month)
    }
}

impl From<PeriodKey> for String {
    fn from(key: PeriodKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for PeriodKey {
    type Error = PeriodKeyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Errors that can occur when constructing [`PeriodKey`] values.
pub enum PeriodKeyError {
    MonthOutOfRange(u32),
    Malformed(String),
}

impl fmt::Display for PeriodKeyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodKeyError::MonthOutOfRange(month) => {
                write!(f, "month {} is outside 1..=12", month)
            }
            PeriodKeyError::Malformed(raw) => {
                write!(f, "`{}` is not a YYYY-MM period key", raw)
            }
        }
    }
}

impl std::error::Error for PeriodKeyError {}
