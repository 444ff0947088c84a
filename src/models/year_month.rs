use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{ProcessingError, Result};

/// A calendar month, written `YYYY-MM` in configuration and row-key prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    year: i32,
    month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            ProcessingError::InvalidFormat(format!("Invalid month: {}-{}", year, month))
        })?;
        Ok(Self { year, month })
    }

    /// Build from constant parts; the month must be in 1..=12.
    pub(crate) const fn from_parts(year: i32, month: u32) -> Self {
        assert!(month >= 1 && month <= 12);
        Self { year, month }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }
}

impl FromStr for YearMonth {
    type Err = ProcessingError;

    fn from_str(s: &str) -> Result<Self> {
        let first_day = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
            .map_err(|_| ProcessingError::InvalidFormat(format!("Invalid month: '{}'", s)))?;
        Ok(Self {
            year: first_day.year(),
            month: first_day.month(),
        })
    }
}

impl TryFrom<String> for YearMonth {
    type Error = ProcessingError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(value: YearMonth) -> Self {
        value.to_string()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_display() {
        let month: YearMonth = "2022-07".parse().unwrap();
        assert_eq!(month.year(), 2022);
        assert_eq!(month.month(), 7);
        assert_eq!(month.to_string(), "2022-07");
    }

    #[test]
    fn test_invalid_month() {
        assert!("2022-13".parse::<YearMonth>().is_err());
        assert!("summer".parse::<YearMonth>().is_err());
        assert!(YearMonth::new(2022, 0).is_err());
    }
}
