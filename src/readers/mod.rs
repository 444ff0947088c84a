pub mod sensor_reader;

pub use sensor_reader::SensorReader;
