pub mod station_loader;

pub use station_loader::{LoadReport, StationLoadSummary, StationLoader};
