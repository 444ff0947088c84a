use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration source error: {0}")]
    ConfigSource(#[from] ::config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Snapshot encoding error: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("Snapshot persist error: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Cannot connect to store: {0}")]
    Connection(String),

    #[error("Table {table} not found")]
    TableNotFound { table: String },

    #[error("Table {table} already exists")]
    TableExists { table: String },

    #[error("Column family {family} does not exist in table {table}")]
    UnknownColumnFamily { table: String, family: String },

    #[error("Malformed line {line} in {}: {message}", .path.display())]
    MalformedLine {
        path: PathBuf,
        line: u64,
        message: String,
    },

    #[error("Invalid row key: '{0}'")]
    InvalidRowKey(String),

    #[error("Invalid value '{value}' for {qualifier} in row {row_key}")]
    InvalidCellValue {
        row_key: String,
        qualifier: String,
        value: String,
    },

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("Store connection is closed")]
    StoreClosed,
}

impl ProcessingError {
    /// Dropping a table that does not exist is the only error the pipeline tolerates.
    pub fn is_table_not_found(&self) -> bool {
        matches!(self, ProcessingError::TableNotFound { .. })
    }
}
