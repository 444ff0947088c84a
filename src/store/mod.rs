//! Wide-column table access.
//!
//! The loader and query engine only talk to [`WideColumnStore`]: table admin,
//! batched row writes, single-row reads and ordered prefix scans. Rows are
//! keyed by strings and compared byte-wise, so scans return keys in
//! lexicographic order.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{StoreBackend, StoreConfig};
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowCell {
    pub family: String,
    pub qualifier: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub key: String,
    pub cells: Vec<RowCell>,
}

impl Row {
    /// Value of the first cell with the given qualifier, in any family.
    pub fn cell_value(&self, qualifier: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|cell| cell.qualifier == qualifier)
            .map(|cell| cell.value.as_str())
    }
}

/// Cells to set on a single row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowMutationEntry {
    pub row_key: String,
    pub cells: Vec<RowCell>,
}

impl RowMutationEntry {
    pub fn new(row_key: impl Into<String>) -> Self {
        Self {
            row_key: row_key.into(),
            cells: Vec::new(),
        }
    }

    pub fn set_cell(
        mut self,
        family: impl Into<String>,
        qualifier: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.cells.push(RowCell {
            family: family.into(),
            qualifier: qualifier.into(),
            value: value.into(),
        });
        self
    }
}

/// A batch of row writes against one table. Each row is applied atomically;
/// the batch as a whole is not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkMutation {
    pub table: String,
    pub entries: Vec<RowMutationEntry>,
}

impl BulkMutation {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            entries: Vec::new(),
        }
    }

    pub fn add(&mut self, entry: RowMutationEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Row selection for a range read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub prefix: Option<String>,
    pub limit: Option<usize>,
}

impl Query {
    /// Every row in the table.
    pub fn all() -> Self {
        Self::default()
    }

    /// Every row whose key starts with `prefix`.
    pub fn prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
            limit: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

pub trait WideColumnStore {
    /// Create a table with the given column families.
    fn create_table(&mut self, table: &str, column_families: &[&str]) -> Result<()>;

    /// Drop a table. Fails with `TableNotFound` when it does not exist.
    fn delete_table(&mut self, table: &str) -> Result<()>;

    fn list_tables(&self) -> Result<Vec<String>>;

    /// Apply a batch of row writes, returning the number of rows written.
    fn bulk_mutate(&mut self, mutation: BulkMutation) -> Result<usize>;

    fn read_row(&self, table: &str, row_key: &str) -> Result<Option<Row>>;

    /// Rows selected by `query`, in key order.
    fn read_rows(&self, table: &str, query: &Query) -> Result<Vec<Row>>;

    /// Release the handle. Any later call fails with `StoreClosed`.
    fn close(&mut self) -> Result<()>;
}

/// Open a store handle for the configured backend.
pub fn connect(config: &StoreConfig) -> Result<Box<dyn WideColumnStore>> {
    match config.backend {
        StoreBackend::Memory => {
            info!("Connected to in-memory store");
            Ok(Box::new(MemoryStore::new()))
        }
        StoreBackend::File => {
            let store = FileStore::open(&config.path)?;
            info!(path = %config.path.display(), "Connected to file store");
            Ok(Box::new(store))
        }
    }
}
