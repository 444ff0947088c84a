use serde::{Deserialize, Serialize};
use std::fmt;

/// A flattened row returned by the per-date projection query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyReading {
    pub date: String,
    pub hour: u8,
    pub temperature: i32,
    pub dewpoint: i32,
    pub humidity: String,
    pub windspeed: String,
    pub pressure: String,
}

impl fmt::Display for HourlyReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}, {}, {}, {}]",
            self.date,
            self.hour,
            self.temperature,
            self.dewpoint,
            self.humidity,
            self.windspeed,
            self.pressure
        )
    }
}
