use serde::{Deserialize, Serialize};

use crate::models::{HourFormat, RowKey};
use crate::utils::constants::{DEWPOINT, HUMIDITY, PRESSURE, TEMPERATURE, WINDSPEED};

/// One data line from a station file, reduced to the fields that get stored.
///
/// Sensor values stay as the text read from the file; they are only
/// interpreted as numbers when queried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SensorReading {
    pub date: String,
    pub hour: u8,
    pub temperature: String,
    pub dewpoint: String,
    pub humidity: String,
    pub windspeed: String,
    pub pressure: String,
}

impl SensorReading {
    /// Identity used to keep one reading per station, date and hour.
    pub fn dedup_key(&self) -> (String, u8) {
        (self.date.clone(), self.hour)
    }

    pub fn row_key(&self, station: &str) -> RowKey {
        RowKey::new(station, self.date.clone(), self.hour)
    }

    pub fn encoded_key(&self, station: &str, format: HourFormat) -> String {
        self.row_key(station).encode(format)
    }

    /// Qualifier/value pairs written into the sensor family.
    pub fn cells(&self) -> [(&'static str, &str); 5] {
        [
            (TEMPERATURE, self.temperature.as_str()),
            (DEWPOINT, self.dewpoint.as_str()),
            (HUMIDITY, self.humidity.as_str()),
            (WINDSPEED, self.windspeed.as_str()),
            (PRESSURE, self.pressure.as_str()),
        ]
    }
}
