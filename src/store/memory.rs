use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;
use tracing::debug;

use crate::error::{ProcessingError, Result};
use crate::store::{BulkMutation, Query, Row, RowCell, WideColumnStore};

/// family -> qualifier -> value
type RowCells = BTreeMap<String, BTreeMap<String, String>>;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct TableData {
    column_families: BTreeSet<String>,
    rows: BTreeMap<String, RowCells>,
}

impl TableData {
    fn to_row(key: &str, cells: &RowCells) -> Row {
        let cells = cells
            .iter()
            .flat_map(|(family, qualifiers)| {
                qualifiers.iter().map(move |(qualifier, value)| RowCell {
                    family: family.clone(),
                    qualifier: qualifier.clone(),
                    value: value.clone(),
                })
            })
            .collect();

        Row {
            key: key.to_string(),
            cells,
        }
    }
}

/// All tables of one store, keyed by name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Catalog {
    tables: BTreeMap<String, TableData>,
}

impl Catalog {
    fn table(&self, name: &str) -> Result<&TableData> {
        self.tables
            .get(name)
            .ok_or_else(|| ProcessingError::TableNotFound {
                table: name.to_string(),
            })
    }

    pub(crate) fn create_table(&mut self, name: &str, column_families: &[&str]) -> Result<()> {
        if self.tables.contains_key(name) {
            return Err(ProcessingError::TableExists {
                table: name.to_string(),
            });
        }

        let table = TableData {
            column_families: column_families.iter().map(|f| f.to_string()).collect(),
            rows: BTreeMap::new(),
        };
        self.tables.insert(name.to_string(), table);
        Ok(())
    }

    pub(crate) fn delete_table(&mut self, name: &str) -> Result<()> {
        self.tables
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| ProcessingError::TableNotFound {
                table: name.to_string(),
            })
    }

    pub(crate) fn list_tables(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    pub(crate) fn apply(&mut self, mutation: BulkMutation) -> Result<usize> {
        let table = self
            .tables
            .get_mut(&mutation.table)
            .ok_or_else(|| ProcessingError::TableNotFound {
                table: mutation.table.clone(),
            })?;

        let mut written = 0;
        for entry in mutation.entries {
            if entry.row_key.is_empty() {
                return Err(ProcessingError::InvalidRowKey(entry.row_key));
            }

            // Reject the whole row before touching it so each row stays atomic.
            if let Some(cell) = entry
                .cells
                .iter()
                .find(|cell| !table.column_families.contains(&cell.family))
            {
                return Err(ProcessingError::UnknownColumnFamily {
                    table: mutation.table.clone(),
                    family: cell.family.clone(),
                });
            }

            let row = table.rows.entry(entry.row_key).or_default();
            for cell in entry.cells {
                row.entry(cell.family)
                    .or_default()
                    .insert(cell.qualifier, cell.value);
            }
            written += 1;
        }

        Ok(written)
    }

    pub(crate) fn read_row(&self, table: &str, row_key: &str) -> Result<Option<Row>> {
        let table = self.table(table)?;
        Ok(table
            .rows
            .get(row_key)
            .map(|cells| TableData::to_row(row_key, cells)))
    }

    pub(crate) fn read_rows(&self, table: &str, query: &Query) -> Result<Vec<Row>> {
        let table = self.table(table)?;
        let limit = query.limit.unwrap_or(usize::MAX);

        let rows: Vec<Row> = match query.prefix.as_deref() {
            Some(prefix) => table
                .rows
                .range::<str, _>((Bound::Included(prefix), Bound::Unbounded))
                .take_while(|(key, _)| key.starts_with(prefix))
                .take(limit)
                .map(|(key, cells)| TableData::to_row(key, cells))
                .collect(),
            None => table
                .rows
                .iter()
                .take(limit)
                .map(|(key, cells)| TableData::to_row(key, cells))
                .collect(),
        };

        Ok(rows)
    }
}

/// Store kept entirely in process memory. Ordered maps give the same key
/// ordering a managed wide-column service would.
#[derive(Debug, Default)]
pub struct MemoryStore {
    catalog: Catalog,
    closed: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_catalog(catalog: Catalog) -> Self {
        Self {
            catalog,
            closed: false,
        }
    }

    pub(crate) fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(ProcessingError::StoreClosed)
        } else {
            Ok(())
        }
    }
}

impl WideColumnStore for MemoryStore {
    fn create_table(&mut self, table: &str, column_families: &[&str]) -> Result<()> {
        self.ensure_open()?;
        self.catalog.create_table(table, column_families)?;
        debug!(table, ?column_families, "Created table");
        Ok(())
    }

    fn delete_table(&mut self, table: &str) -> Result<()> {
        self.ensure_open()?;
        self.catalog.delete_table(table)?;
        debug!(table, "Deleted table");
        Ok(())
    }

    fn list_tables(&self) -> Result<Vec<String>> {
        self.ensure_open()?;
        Ok(self.catalog.list_tables())
    }

    fn bulk_mutate(&mut self, mutation: BulkMutation) -> Result<usize> {
        self.ensure_open()?;
        let table = mutation.table.clone();
        let written = self.catalog.apply(mutation)?;
        debug!(table = %table, rows = written, "Applied bulk mutation");
        Ok(written)
    }

    fn read_row(&self, table: &str, row_key: &str) -> Result<Option<Row>> {
        self.ensure_open()?;
        self.catalog.read_row(table, row_key)
    }

    fn read_rows(&self, table: &str, query: &Query) -> Result<Vec<Row>> {
        self.ensure_open()?;
        self.catalog.read_rows(table, query)
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}
