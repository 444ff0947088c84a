use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::models::{HourFormat, HourlyReading, RowKey, YearMonth};
use crate::store::{Query, Row, WideColumnStore};
use crate::utils::constants::{DEWPOINT, HUMIDITY, PRESSURE, TEMPERATURE, WINDSPEED};

/// Read-only queries over the sensor table. Each call is one request against
/// the store; nothing is cached between calls.
pub struct QueryEngine<'a> {
    store: &'a dyn WideColumnStore,
    table: String,
    hour_format: HourFormat,
}

impl<'a> QueryEngine<'a> {
    pub fn new(store: &'a dyn WideColumnStore, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
            hour_format: HourFormat::default(),
        }
    }

    pub fn with_hour_format(mut self, hour_format: HourFormat) -> Self {
        self.hour_format = hour_format;
        self
    }

    /// Number of rows in the table.
    pub fn count_rows(&self) -> Result<usize> {
        Ok(self.store.read_rows(&self.table, &Query::all())?.len())
    }

    /// Temperature stored under one exact key. `None` when the row or the
    /// cell does not exist.
    pub fn temperature_at(&self, key: &RowKey) -> Result<Option<i32>> {
        let encoded = key.encode(self.hour_format);
        let row = match self.store.read_row(&self.table, &encoded)? {
            Some(row) => row,
            None => {
                debug!(key = %encoded, "Row not found");
                return Ok(None);
            }
        };

        int_cell(&row, TEMPERATURE)
    }

    /// Highest windspeed recorded by a station during one month.
    pub fn max_windspeed(&self, station: &str, month: &YearMonth) -> Result<Option<i32>> {
        self.max_over_prefix(&RowKey::month_prefix(station, month), WINDSPEED)
    }

    /// Every reading of a station on one date, in store key order.
    ///
    /// Keys with unpadded hours sort as text, so hour 10 comes before hour 2.
    pub fn readings_on(&self, station: &str, date: &str) -> Result<Vec<HourlyReading>> {
        let rows = self
            .store
            .read_rows(&self.table, &Query::prefix(RowKey::date_prefix(station, date)))?;

        rows.iter().map(project_row).collect()
    }

    /// Highest temperature across every (month, station) prefix.
    pub fn max_temperature(&self, stations: &[String], months: &[YearMonth]) -> Result<Option<i32>> {
        let mut max: Option<i32> = None;
        for month in months {
            for station in stations {
                let prefix_max =
                    self.max_over_prefix(&RowKey::month_prefix(station, month), TEMPERATURE)?;
                max = max.max(prefix_max);
            }
        }
        Ok(max)
    }

    fn max_over_prefix(&self, prefix: &str, qualifier: &str) -> Result<Option<i32>> {
        let rows = self.store.read_rows(&self.table, &Query::prefix(prefix))?;
        debug!(prefix, rows = rows.len(), qualifier, "Scanned prefix");

        let mut max = None;
        for row in &rows {
            if let Some(value) = int_cell(row, qualifier)? {
                max = max.max(Some(value));
            }
        }
        Ok(max)
    }
}

/// Integer value of a cell. Absent cells are `None`; present cells that are
/// not integers are an error.
fn int_cell(row: &Row, qualifier: &str) -> Result<Option<i32>> {
    row.cell_value(qualifier)
        .map(|value| {
            value
                .parse::<i32>()
                .map_err(|_| ProcessingError::InvalidCellValue {
                    row_key: row.key.clone(),
                    qualifier: qualifier.to_string(),
                    value: value.to_string(),
                })
        })
        .transpose()
}

fn project_row(row: &Row) -> Result<HourlyReading> {
    let key = RowKey::parse(&row.key)?;
    let text = |qualifier: &str| row.cell_value(qualifier).unwrap_or_default().to_string();

    Ok(HourlyReading {
        date: key.date,
        hour: key.hour,
        temperature: int_cell(row, TEMPERATURE)?.unwrap_or_default(),
        dewpoint: int_cell(row, DEWPOINT)?.unwrap_or_default(),
        humidity: text(HUMIDITY),
        windspeed: text(WINDSPEED),
        pressure: text(PRESSURE),
    })
}
