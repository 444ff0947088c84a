use serde::Serialize;
use std::fmt;
use tracing::info;

use crate::analyzers::QueryEngine;
use crate::config::AppConfig;
use crate::error::Result;
use crate::models::{HourlyReading, RowKey, YearMonth};
use crate::utils::constants::{MISSING_VALUE, TEMPERATURE_FLOOR};

/// Results of the four fixed queries, with "no data" mapped to their
/// reporting defaults.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryReport {
    pub row_count: usize,
    pub point_key: String,
    pub point_temperature: i32,
    pub windspeed_prefix: String,
    pub max_windspeed: i32,
    pub daily_prefix: String,
    pub daily_readings: Vec<HourlyReading>,
    pub summer_months: Vec<YearMonth>,
    pub summer_stations: Vec<String>,
    pub max_summer_temperature: i32,
}

impl QueryReport {
    pub fn collect(engine: &QueryEngine<'_>, config: &AppConfig) -> Result<Self> {
        let queries = &config.queries;

        let row_count = engine.count_rows()?;
        info!(rows = row_count, "Counted table rows");

        let point = queries.point_key();
        let point_temperature = engine.temperature_at(&point)?.unwrap_or(MISSING_VALUE);
        info!(key = %point.encode(config.hour_format), temperature = point_temperature, "Point lookup");

        let max_windspeed = engine
            .max_windspeed(&queries.windspeed_station, &queries.windspeed_month)?
            .unwrap_or(MISSING_VALUE);
        info!(
            station = %queries.windspeed_station,
            month = %queries.windspeed_month,
            windspeed = max_windspeed,
            "Monthly windspeed maximum"
        );

        let daily_date = queries.daily_date_text();
        let daily_readings = engine.readings_on(&queries.daily_station, &daily_date)?;
        info!(
            station = %queries.daily_station,
            date = %daily_date,
            readings = daily_readings.len(),
            "Daily readings"
        );

        let summer_stations = config.summer_stations();
        let max_summer_temperature = engine
            .max_temperature(&summer_stations, &queries.summer_months)?
            .unwrap_or(TEMPERATURE_FLOOR);
        info!(temperature = max_summer_temperature, "Summer temperature maximum");

        Ok(Self {
            row_count,
            point_key: point.encode(config.hour_format),
            point_temperature,
            windspeed_prefix: RowKey::month_prefix(&queries.windspeed_station, &queries.windspeed_month),
            max_windspeed,
            daily_prefix: RowKey::date_prefix(&queries.daily_station, &daily_date),
            daily_readings,
            summer_months: queries.summer_months.clone(),
            summer_stations,
            max_summer_temperature,
        })
    }
}

impl fmt::Display for QueryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Total rows in table: {}", self.row_count)?;
        writeln!(f)?;
        writeln!(f, "Query 1 - Temperature at {}: {}", self.point_key, self.point_temperature)?;
        writeln!(f, "Query 2 - Highest windspeed under {}: {}", self.windspeed_prefix, self.max_windspeed)?;
        writeln!(f, "Query 3 - Readings under {}:", self.daily_prefix)?;
        for reading in &self.daily_readings {
            writeln!(f, "  {}", reading)?;
        }
        writeln!(f, "  Total rows: {}", self.daily_readings.len())?;

        let months: Vec<String> = self.summer_months.iter().map(|m| m.to_string()).collect();
        write!(
            f,
            "Query 4 - Highest temperature for {} at {}: {}",
            months.join(", "),
            self.summer_stations.join(", "),
            self.max_summer_temperature
        )
    }
}
