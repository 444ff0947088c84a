use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ProcessingError, Result};
use crate::models::YearMonth;
use crate::utils::constants::ROW_KEY_SEPARATOR;

/// How the hour component is rendered inside a row key.
///
/// `Unpadded` keeps the historical layout (`YVR#2022-10-01#9`), where keys sort
/// lexicographically rather than chronologically past hour 9. `ZeroPadded`
/// renders two digits so that key order matches time order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HourFormat {
    #[default]
    Unpadded,
    ZeroPadded,
}

impl HourFormat {
    pub fn render(&self, hour: u8) -> String {
        match self {
            HourFormat::Unpadded => hour.to_string(),
            HourFormat::ZeroPadded => format!("{:02}", hour),
        }
    }
}

/// Composite row key `STATION#DATE#HOUR`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowKey {
    pub station: String,
    pub date: String,
    pub hour: u8,
}

impl RowKey {
    pub fn new(station: impl Into<String>, date: impl Into<String>, hour: u8) -> Self {
        Self {
            station: station.into(),
            date: date.into(),
            hour,
        }
    }

    pub fn encode(&self, format: HourFormat) -> String {
        format!(
            "{}{sep}{}{sep}{}",
            self.station,
            self.date,
            format.render(self.hour),
            sep = ROW_KEY_SEPARATOR
        )
    }

    /// Split an encoded key back into its parts. Accepts both hour layouts.
    pub fn parse(key: &str) -> Result<Self> {
        let parts: Vec<&str> = key.split(ROW_KEY_SEPARATOR).collect();
        if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(ProcessingError::InvalidRowKey(key.to_string()));
        }

        let hour = parts[2]
            .parse::<u8>()
            .map_err(|_| ProcessingError::InvalidRowKey(key.to_string()))?;

        Ok(Self::new(parts[0], parts[1], hour))
    }

    /// Prefix matching every row of a station within one calendar month.
    pub fn month_prefix(station: &str, month: &YearMonth) -> String {
        format!("{}{}{}", station, ROW_KEY_SEPARATOR, month)
    }

    /// Prefix matching every row of a station on one date.
    pub fn date_prefix(station: &str, date: &str) -> String {
        format!("{}{}{}", station, ROW_KEY_SEPARATOR, date)
    }
}

impl fmt::Display for RowKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode(HourFormat::Unpadded))
    }
}
