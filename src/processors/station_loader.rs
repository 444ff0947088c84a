use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use tracing::{debug, info};

use crate::config::StationSource;
use crate::error::Result;
use crate::models::{HourFormat, SensorReading};
use crate::readers::SensorReader;
use crate::store::{BulkMutation, RowMutationEntry, WideColumnStore};
use crate::utils::progress::ProgressReporter;

/// Outcome of loading one station file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StationLoadSummary {
    pub station: String,
    pub lines_read: usize,
    pub rows_written: usize,
    pub duplicates_skipped: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    pub stations: Vec<StationLoadSummary>,
}

impl LoadReport {
    pub fn total_rows(&self) -> usize {
        self.stations.iter().map(|s| s.rows_written).sum()
    }

    pub fn total_duplicates(&self) -> usize {
        self.stations.iter().map(|s| s.duplicates_skipped).sum()
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Load Summary:")?;
        for s in &self.stations {
            writeln!(
                f,
                "  {}: {} lines, {} rows written, {} duplicate hours skipped",
                s.station, s.lines_read, s.rows_written, s.duplicates_skipped
            )?;
        }
        write!(
            f,
            "  Total: {} rows, {} duplicates skipped",
            self.total_rows(),
            self.total_duplicates()
        )
    }
}

/// Writes station readings into the table, one batch per station.
pub struct StationLoader {
    table: String,
    column_family: String,
    hour_format: HourFormat,
    reader: SensorReader,
}

impl StationLoader {
    pub fn new(table: impl Into<String>, column_family: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            column_family: column_family.into(),
            hour_format: HourFormat::default(),
            reader: SensorReader::new(),
        }
    }

    pub fn with_hour_format(mut self, hour_format: HourFormat) -> Self {
        self.hour_format = hour_format;
        self
    }

    /// Drop the table if it exists, then create it empty.
    pub fn reset_table(&self, store: &mut dyn WideColumnStore) -> Result<()> {
        match store.delete_table(&self.table) {
            Ok(()) => debug!(table = %self.table, "Dropped existing table"),
            Err(e) if e.is_table_not_found() => {
                debug!(table = %self.table, "No existing table to drop")
            }
            Err(e) => return Err(e),
        }

        store.create_table(&self.table, &[self.column_family.as_str()])?;
        info!(table = %self.table, family = %self.column_family, "Table ready");
        Ok(())
    }

    /// Load one station file as a single batched write.
    pub fn load_station(
        &self,
        store: &mut dyn WideColumnStore,
        source: &StationSource,
    ) -> Result<StationLoadSummary> {
        let readings = self.reader.read_readings(&source.file)?;
        self.load_readings(store, &source.code, &readings)
    }

    /// Stage one row per distinct (date, hour); the first reading of an hour wins.
    pub fn load_readings(
        &self,
        store: &mut dyn WideColumnStore,
        station: &str,
        readings: &[SensorReading],
    ) -> Result<StationLoadSummary> {
        let mut seen_hours = HashSet::new();
        let mut mutation = BulkMutation::new(self.table.clone());

        for reading in readings {
            if !seen_hours.insert(reading.dedup_key()) {
                continue;
            }

            let entry = reading.cells().iter().fold(
                RowMutationEntry::new(reading.encoded_key(station, self.hour_format)),
                |entry, (qualifier, value)| entry.set_cell(self.column_family.as_str(), *qualifier, *value),
            );
            mutation.add(entry);
        }

        let staged = mutation.len();
        let rows_written = if mutation.is_empty() {
            0
        } else {
            store.bulk_mutate(mutation)?
        };

        let summary = StationLoadSummary {
            station: station.to_string(),
            lines_read: readings.len(),
            rows_written,
            duplicates_skipped: readings.len() - staged,
        };
        info!(
            station = %summary.station,
            lines = summary.lines_read,
            rows = summary.rows_written,
            duplicates = summary.duplicates_skipped,
            "Loaded station"
        );

        Ok(summary)
    }

    /// Load every station in order. The first failure aborts the run.
    pub fn load_all(
        &self,
        store: &mut dyn WideColumnStore,
        sources: &[StationSource],
        progress: Option<&ProgressReporter>,
    ) -> Result<LoadReport> {
        let mut report = LoadReport::default();

        for source in sources {
            if let Some(p) = progress {
                p.set_message(&format!("Loading {} from {}", source.code, source.file.display()));
            }

            report.stations.push(self.load_station(store, source)?);

            if let Some(p) = progress {
                p.increment(1);
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use crate::store::{MemoryStore, Query};
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use tempfile::TempDir;

    const HEADER: &str = "STATION,DATE,TIME,TEMP,DEWPOINT,HUMIDITY,WINDSPEED,WINDDIR,PRESSURE";

    fn write_station_file(dir: &TempDir, name: &str, lines: &[&str]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "{}", HEADER).unwrap();
        for line in lines {
            writeln!(file, "{}", line).unwrap();
        }
        path
    }

    fn ready_store(loader: &StationLoader) -> MemoryStore {
        let mut store = MemoryStore::new();
        loader.reset_table(&mut store).unwrap();
        store
    }

    #[test]
    fn test_reset_table_is_idempotent() -> Result<()> {
        let loader = StationLoader::new("weather", "sensor");
        let mut store = MemoryStore::new();

        loader.reset_table(&mut store)?;
        loader.reset_table(&mut store)?;
        assert_eq!(store.list_tables()?, vec!["weather".to_string()]);
        Ok(())
    }

    #[test]
    fn test_reset_table_clears_rows() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_station_file(&dir, "yvr.csv", &["YVR,2022-10-01,10:00,15,10,72,4,N,30.01"]);
        let loader = StationLoader::new("weather", "sensor");
        let mut store = ready_store(&loader);

        loader.load_station(&mut store, &StationSource::new("YVR", path))?;
        loader.reset_table(&mut store)?;
        assert!(store.read_rows("weather", &Query::all())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_first_reading_of_hour_wins() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_station_file(
            &dir,
            "seatac.csv",
            &[
                "SEA,2022-10-02,7:00,12,8,76,3,SW,30.12",
                "SEA,2022-10-02,7:53,14,9,70,6,SW,30.11",
                "SEA,2022-10-02,8:53,15,9,67,5,W,30.10",
                "SEA,2022-10-03,7:53,11,7,80,2,S,30.20",
            ],
        );
        let loader = StationLoader::new("weather", "sensor");
        let mut store = ready_store(&loader);

        let summary = loader.load_station(&mut store, &StationSource::new("SEA", path))?;
        assert_eq!(
            summary,
            StationLoadSummary {
                station: "SEA".to_string(),
                lines_read: 4,
                rows_written: 3,
                duplicates_skipped: 1,
            }
        );

        let row = store.read_row("weather", "SEA#2022-10-02#7")?.unwrap();
        assert_eq!(row.cell_value("temperature"), Some("12"));
        assert_eq!(row.cell_value("windspeed"), Some("3"));
        Ok(())
    }

    #[test]
    fn test_padded_source_hours_share_a_key() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_station_file(
            &dir,
            "seatac.csv",
            &[
                "SEA,2022-10-02,07:00,12,8,76,3,SW,30.12",
                "SEA,2022-10-02,7:30,14,9,70,6,SW,30.11",
            ],
        );
        let loader = StationLoader::new("weather", "sensor");
        let mut store = ready_store(&loader);

        let summary = loader.load_station(&mut store, &StationSource::new("SEA", path))?;
        assert_eq!(summary.rows_written, 1);
        assert_eq!(summary.duplicates_skipped, 1);

        assert!(store.read_row("weather", "SEA#2022-10-02#07")?.is_none());
        let row = store.read_row("weather", "SEA#2022-10-02#7")?.unwrap();
        assert_eq!(row.cell_value("temperature"), Some("12"));
        Ok(())
    }

    #[test]
    fn test_written_fields_round_trip() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_station_file(&dir, "pdx.csv", &["PDX,2022-09-14,3:53,18,11,64,12,NW,29.98"]);
        let loader = StationLoader::new("weather", "sensor");
        let mut store = ready_store(&loader);
        loader.load_station(&mut store, &StationSource::new("PDX", path))?;

        let row = store.read_row("weather", "PDX#2022-09-14#3")?.unwrap();
        let values: Vec<(&str, &str)> = row
            .cells
            .iter()
            .map(|c| (c.qualifier.as_str(), c.value.as_str()))
            .collect();
        assert_eq!(
            values,
            vec![
                ("dewpoint", "11"),
                ("humidity", "64"),
                ("pressure", "29.98"),
                ("temperature", "18"),
                ("windspeed", "12"),
            ]
        );
        assert!(row.cells.iter().all(|c| c.family == "sensor"));
        Ok(())
    }

    #[test]
    fn test_zero_padded_keys() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_station_file(&dir, "yvr.csv", &["YVR,2022-10-01,9:00,15,10,72,4,N,30.01"]);
        let loader = StationLoader::new("weather", "sensor").with_hour_format(HourFormat::ZeroPadded);
        let mut store = ready_store(&loader);
        loader.load_station(&mut store, &StationSource::new("YVR", path))?;

        assert!(store.read_row("weather", "YVR#2022-10-01#09")?.is_some());
        Ok(())
    }

    #[test]
    fn test_empty_file_writes_nothing() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_station_file(&dir, "empty.csv", &[]);
        let loader = StationLoader::new("weather", "sensor");
        let mut store = ready_store(&loader);

        let summary = loader.load_station(&mut store, &StationSource::new("SEA", path))?;
        assert_eq!(summary.rows_written, 0);
        assert!(store.read_rows("weather", &Query::all())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_malformed_line_aborts_load() {
        let dir = TempDir::new().unwrap();
        let path = write_station_file(
            &dir,
            "bad.csv",
            &["SEA,2022-10-02,7:00,12,8,76,3,SW,30.12", "SEA,2022-10-02"],
        );
        let loader = StationLoader::new("weather", "sensor");
        let mut store = ready_store(&loader);

        let err = loader
            .load_station(&mut store, &StationSource::new("SEA", path))
            .unwrap_err();
        assert!(matches!(err, ProcessingError::MalformedLine { line: 3, .. }));
        assert!(store.read_rows("weather", &Query::all()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_file_aborts_load_all() {
        let dir = TempDir::new().unwrap();
        let good = write_station_file(&dir, "sea.csv", &["SEA,2022-10-02,7:00,12,8,76,3,SW,30.12"]);
        let sources = vec![
            StationSource::new("SEA", good),
            StationSource::new("YVR", dir.path().join("missing.csv")),
        ];
        let loader = StationLoader::new("weather", "sensor");
        let mut store = ready_store(&loader);

        let err = loader.load_all(&mut store, &sources, None).unwrap_err();
        assert!(matches!(err, ProcessingError::Io(_)));
    }

    #[test]
    fn test_load_report_totals() -> Result<()> {
        let dir = TempDir::new()?;
        let sea = write_station_file(
            &dir,
            "sea.csv",
            &["SEA,2022-10-02,7:00,12,8,76,3,SW,30.12", "SEA,2022-10-02,7:30,13,8,76,3,SW,30.12"],
        );
        let yvr = write_station_file(&dir, "yvr.csv", &["YVR,2022-10-01,10:00,15,10,72,4,N,30.01"]);
        let loader = StationLoader::new("weather", "sensor");
        let mut store = ready_store(&loader);

        let report = loader.load_all(
            &mut store,
            &[StationSource::new("SEA", sea), StationSource::new("YVR", yvr)],
            Some(&ProgressReporter::silent()),
        )?;
        assert_eq!(report.total_rows(), 2);
        assert_eq!(report.total_duplicates(), 1);
        assert!(report.to_string().contains("Total: 2 rows"));
        Ok(())
    }
}
