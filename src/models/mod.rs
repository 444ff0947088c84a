pub mod hourly;
pub mod reading;
pub mod row_key;
pub mod year_month;

pub use hourly::HourlyReading;
pub use reading::SensorReading;
pub use row_key::{HourFormat, RowKey};
pub use year_month::YearMonth;
