//! A bare invocation reads `data/*.csv` relative to the working directory, so
//! this file holds a single test that owns the process working directory.

use clap::Parser;
use pretty_assertions::assert_eq;
use std::io::Write;
use std::path::Path;
use tempfile::TempDir;
use weather_table::cli::commands::{load_phase, query_phase, with_store};
use weather_table::cli::{run, Cli};
use weather_table::config::AppConfig;

const HEADER: &str = "STATION,DATE,TIME,TEMP,DEWPOINT,HUMIDITY,WINDSPEED,WINDDIR,PRESSURE";

fn write_station(dir: &Path, name: &str, lines: &[&str]) {
    let mut file = std::fs::File::create(dir.join(name)).expect("Failed to create station file");
    writeln!(file, "{}", HEADER).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
}

#[test]
fn test_run_without_arguments_uses_built_in_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let data = temp_dir.path().join("data");
    std::fs::create_dir(&data).unwrap();

    write_station(
        &data,
        "seatac.csv",
        &[
            "SEA,2022-10-02,9:53,14,8,70,4,S,30.11",
            "SEA,2022-10-02,10:53,16,8,65,5,S,30.10",
            "SEA,2022-07-14,13:53,31,12,40,6,SW,30.02",
        ],
    );
    write_station(
        &data,
        "vancouver.csv",
        &["YVR,2022-10-01,10:00,12,9,80,3,N,30.01"],
    );
    write_station(
        &data,
        "portland.csv",
        &[
            "PDX,2022-09-03,4:53,11,7,85,9,NW,29.98",
            "PDX,2022-09-21,15:53,27,10,35,14,W,29.90",
        ],
    );

    std::env::set_current_dir(temp_dir.path()).unwrap();

    run(Cli::parse_from(["weather-table", "--json"])).unwrap();
    run(Cli::parse_from(["weather-table"])).unwrap();

    let config = AppConfig::load(None).unwrap();
    let (load, queries) = with_store(&config.store, |store| {
        let load = load_phase(store, &config, true)?;
        let queries = query_phase(store, &config)?;
        Ok((load, queries))
    })
    .unwrap();

    assert_eq!(load.total_rows(), 6);
    assert_eq!(queries.row_count, 6);
    assert_eq!(queries.point_temperature, 12);
    assert_eq!(queries.max_windspeed, 14);
    assert_eq!(queries.daily_readings.len(), 2);
    assert_eq!(queries.max_summer_temperature, 31);
}
