use chrono::NaiveDate;
use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::models::{HourFormat, RowKey, YearMonth};
use crate::utils::constants::{
    COLUMN_FAMILY, DATE_FORMAT, DEFAULT_STORE_PATH, DEFAULT_TABLE, ENV_PREFIX, ROW_KEY_SEPARATOR,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StoreBackend {
    #[default]
    Memory,
    File,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Memory,
            path: PathBuf::from(DEFAULT_STORE_PATH),
        }
    }
}

/// A station code and the file holding its readings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct StationSource {
    #[validate(length(min = 1))]
    pub code: String,

    pub file: PathBuf,
}

impl StationSource {
    pub fn new(code: impl Into<String>, file: impl Into<PathBuf>) -> Self {
        Self {
            code: code.into(),
            file: file.into(),
        }
    }
}

/// Parameters of the four fixed queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct QueryConfig {
    #[validate(length(min = 1))]
    pub point_station: String,
    pub point_date: NaiveDate,
    #[validate(range(max = 23))]
    pub point_hour: u8,

    #[validate(length(min = 1))]
    pub windspeed_station: String,
    pub windspeed_month: YearMonth,

    #[validate(length(min = 1))]
    pub daily_station: String,
    pub daily_date: NaiveDate,

    #[validate(length(min = 1))]
    pub summer_months: Vec<YearMonth>,
    /// Stations scanned for the summer maximum; empty means every configured station.
    #[serde(default)]
    pub summer_stations: Vec<String>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            point_station: "YVR".to_string(),
            point_date: NaiveDate::from_ymd_opt(2022, 10, 1).unwrap_or_default(),
            point_hour: 10,
            windspeed_station: "PDX".to_string(),
            windspeed_month: YearMonth::from_parts(2022, 9),
            daily_station: "SEA".to_string(),
            daily_date: NaiveDate::from_ymd_opt(2022, 10, 2).unwrap_or_default(),
            summer_months: vec![
                YearMonth::from_parts(2022, 7),
                YearMonth::from_parts(2022, 8),
            ],
            summer_stations: Vec::new(),
        }
    }
}

impl QueryConfig {
    pub fn point_key(&self) -> RowKey {
        RowKey::new(
            self.point_station.clone(),
            self.point_date.format(DATE_FORMAT).to_string(),
            self.point_hour,
        )
    }

    pub fn daily_date_text(&self) -> String {
        self.daily_date.format(DATE_FORMAT).to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct AppConfig {
    #[validate(length(min = 1))]
    pub table: String,

    #[validate(length(min = 1))]
    pub column_family: String,

    pub hour_format: HourFormat,

    #[validate(nested)]
    pub store: StoreConfig,

    #[validate(length(min = 1), nested)]
    pub stations: Vec<StationSource>,

    #[validate(nested)]
    pub queries: QueryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            column_family: COLUMN_FAMILY.to_string(),
            hour_format: HourFormat::default(),
            store: StoreConfig::default(),
            stations: vec![
                StationSource::new("SEA", "data/seatac.csv"),
                StationSource::new("YVR", "data/vancouver.csv"),
                StationSource::new("PDX", "data/portland.csv"),
            ],
            queries: QueryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Layer defaults, an optional TOML file and `WEATHER_TABLE_*` environment
    /// variables, then validate the result.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&AppConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__"),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.check()?;
        Ok(config)
    }

    pub fn check(&self) -> Result<()> {
        self.validate()?;

        let codes = self
            .stations
            .iter()
            .map(|s| s.code.as_str())
            .chain([
                self.queries.point_station.as_str(),
                self.queries.windspeed_station.as_str(),
                self.queries.daily_station.as_str(),
            ])
            .chain(self.queries.summer_stations.iter().map(String::as_str));

        for code in codes {
            if code.contains(ROW_KEY_SEPARATOR) {
                return Err(ProcessingError::Config(format!(
                    "Station code '{}' must not contain '{}'",
                    code, ROW_KEY_SEPARATOR
                )));
            }
        }

        Ok(())
    }

    /// Stations scanned by the summer maximum query.
    pub fn summer_stations(&self) -> Vec<String> {
        if self.queries.summer_stations.is_empty() {
            self.stations.iter().map(|s| s.code.clone()).collect()
        } else {
            self.queries.summer_stations.clone()
        }
    }
}
