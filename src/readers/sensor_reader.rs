use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::{ProcessingError, Result};
use crate::models::SensorReading;
use crate::utils::constants::{
    DATE_FORMAT, DEFAULT_BUFFER_SIZE, FIELD_DATE, FIELD_DEWPOINT, FIELD_HUMIDITY, FIELD_PRESSURE,
    FIELD_TEMPERATURE, FIELD_TIME, FIELD_WINDSPEED, MIN_FIELDS,
};

/// Reads hourly station files: one header line, then comma separated data
/// lines with the date at index 1, the time at index 2 and sensor values at
/// indices 3-6 and 8.
#[derive(Debug, Default)]
pub struct SensorReader;

impl SensorReader {
    pub fn new() -> Self {
        Self
    }

    /// Read every data line of a station file. Any malformed line aborts the read.
    pub fn read_readings(&self, path: &Path) -> Result<Vec<SensorReading>> {
        let file = File::open(path)?;
        let reader = BufReader::with_capacity(DEFAULT_BUFFER_SIZE, file);
        self.read_from(reader, path)
    }

    /// Read from any source; `origin` is only used in error messages.
    ///
    /// Empty lines between records are malformed too. Empty lines after the
    /// last record are ignored.
    pub fn read_from<R: Read>(&self, source: R, origin: &Path) -> Result<Vec<SensorReading>> {
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(source);
        reader.headers()?;

        let mut record = StringRecord::new();
        let mut readings = Vec::new();
        loop {
            let start = reader.position().line();
            if !reader.read_record(&mut record)? {
                break;
            }

            let line = record.position().map(|p| p.line()).unwrap_or(start);
            let malformed = |message: String| ProcessingError::MalformedLine {
                path: origin.to_path_buf(),
                line,
                message,
            };

            // csv skips empty lines silently; a record spanning more than one
            // newline means at least one was skipped before it.
            if reader.position().line() > start + 1 {
                return Err(malformed("empty line before record".to_string()));
            }

            readings.push(parse_record(&record).map_err(malformed)?);
        }

        Ok(readings)
    }
}

fn parse_record(record: &StringRecord) -> std::result::Result<SensorReading, String> {
    if record.len() < MIN_FIELDS {
        return Err(format!(
            "expected at least {} fields, found {}",
            MIN_FIELDS,
            record.len()
        ));
    }

    let date = &record[FIELD_DATE];
    NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|_| format!("invalid date '{}'", date))?;

    let hour = parse_hour(&record[FIELD_TIME])?;

    Ok(SensorReading {
        date: date.to_string(),
        hour,
        temperature: numeric_field(record, FIELD_TEMPERATURE, "temperature")?,
        dewpoint: numeric_field(record, FIELD_DEWPOINT, "dewpoint")?,
        humidity: numeric_field(record, FIELD_HUMIDITY, "humidity")?,
        windspeed: numeric_field(record, FIELD_WINDSPEED, "windspeed")?,
        pressure: numeric_field(record, FIELD_PRESSURE, "pressure")?,
    })
}

/// Hour is the integer before the first ':' of `HH:MM[:SS]`.
fn parse_hour(time: &str) -> std::result::Result<u8, String> {
    let hour_text = time.split(':').next().unwrap_or_default();
    match hour_text.parse::<u8>() {
        Ok(hour) if hour <= 23 => Ok(hour),
        _ => Err(format!("invalid time '{}'", time)),
    }
}

fn numeric_field(
    record: &StringRecord,
    index: usize,
    name: &str,
) -> std::result::Result<String, String> {
    let value = &record[index];
    if value.parse::<f64>().is_err() {
        return Err(format!("{} value '{}' is not numeric", name, value));
    }
    Ok(value.to_string())
}
