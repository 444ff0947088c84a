/// Table layout
pub const DEFAULT_TABLE: &str = "weather";
pub const COLUMN_FAMILY: &str = "sensor";
pub const ROW_KEY_SEPARATOR: char = '#';

/// Cell qualifiers within the sensor family
pub const TEMPERATURE: &str = "temperature";
pub const DEWPOINT: &str = "dewpoint";
pub const HUMIDITY: &str = "humidity";
pub const WINDSPEED: &str = "windspeed";
pub const PRESSURE: &str = "pressure";

/// Source file column positions
pub const FIELD_DATE: usize = 1;
pub const FIELD_TIME: usize = 2;
pub const FIELD_TEMPERATURE: usize = 3;
pub const FIELD_DEWPOINT: usize = 4;
pub const FIELD_HUMIDITY: usize = 5;
pub const FIELD_WINDSPEED: usize = 6;
pub const FIELD_PRESSURE: usize = 8;
pub const MIN_FIELDS: usize = 9;

/// Date format used in source files and row keys
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Result returned when a point lookup finds nothing
pub const MISSING_VALUE: i32 = 0;

/// Starting value for the multi-prefix temperature maximum
pub const TEMPERATURE_FLOOR: i32 = -100;

/// Configuration
pub const ENV_PREFIX: &str = "WEATHER_TABLE";
pub const DEFAULT_STORE_PATH: &str = "weather-store.json";

/// Processing defaults
pub const DEFAULT_BUFFER_SIZE: usize = 8192 * 16; // 128KB
