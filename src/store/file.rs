use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{ProcessingError, Result};
use crate::store::memory::{Catalog, MemoryStore};
use crate::store::{BulkMutation, Query, Row, WideColumnStore};

/// Store whose tables survive between runs as a JSON snapshot on disk.
///
/// Every admin or write call is followed by a snapshot rewrite through a
/// temporary file in the same directory, so a crash never leaves a partially
/// written snapshot behind. Read-only sessions never touch the file.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    inner: MemoryStore,
    /// In-memory state differs from the snapshot on disk.
    dirty: bool,
}

impl FileStore {
    pub fn open(path: &Path) -> Result<Self> {
        let dir = snapshot_dir(path);
        if !dir.is_dir() {
            return Err(ProcessingError::Connection(format!(
                "store directory {} does not exist",
                dir.display()
            )));
        }

        let catalog = if path.exists() {
            let file = File::open(path).map_err(|e| {
                ProcessingError::Connection(format!("cannot open {}: {}", path.display(), e))
            })?;
            serde_json::from_reader::<_, Catalog>(BufReader::new(file)).map_err(|e| {
                ProcessingError::Connection(format!(
                    "unreadable snapshot {}: {}",
                    path.display(),
                    e
                ))
            })?
        } else {
            Catalog::default()
        };

        Ok(Self {
            path: path.to_path_buf(),
            inner: MemoryStore::from_catalog(catalog),
            dirty: false,
        })
    }

    fn flush(&mut self) -> Result<()> {
        if !self.dirty {
            return Ok(());
        }
        let mut temp = NamedTempFile::new_in(snapshot_dir(&self.path))?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            serde_json::to_writer(&mut writer, self.inner.catalog())?;
            writer.flush()?;
        }
        temp.persist(&self.path)?;
        self.dirty = false;
        debug!(path = %self.path.display(), "Wrote store snapshot");
        Ok(())
    }
}

fn snapshot_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

impl WideColumnStore for FileStore {
    fn create_table(&mut self, table: &str, column_families: &[&str]) -> Result<()> {
        self.inner.create_table(table, column_families)?;
        self.dirty = true;
        self.flush()
    }

    fn delete_table(&mut self, table: &str) -> Result<()> {
        self.inner.delete_table(table)?;
        self.dirty = true;
        self.flush()
    }

    fn list_tables(&self) -> Result<Vec<String>> {
        self.inner.list_tables()
    }

    fn bulk_mutate(&mut self, mutation: BulkMutation) -> Result<usize> {
        let written = self.inner.bulk_mutate(mutation)?;
        self.dirty = true;
        self.flush()?;
        Ok(written)
    }

    fn read_row(&self, table: &str, row_key: &str) -> Result<Option<Row>> {
        self.inner.read_row(table, row_key)
    }

    fn read_rows(&self, table: &str, query: &Query) -> Result<Vec<Row>> {
        self.inner.read_rows(table, query)
    }

    fn close(&mut self) -> Result<()> {
        if self.inner.is_closed() {
            return Ok(());
        }
        let flushed = self.flush();
        self.inner.close()?;
        flushed
    }
}

impl Drop for FileStore {
    fn drop(&mut self) {
        if !self.inner.is_closed() {
            if let Err(e) = self.close() {
                warn!(path = %self.path.display(), error = %e, "Failed to close file store");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::RowMutationEntry;
    use tempfile::TempDir;

    #[test]
    fn test_snapshot_survives_reopen() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("store.json");

        {
            let mut store = FileStore::open(&path)?;
            store.create_table("weather", &["sensor"])?;
            let mut mutation = BulkMutation::new("weather");
            mutation.add(RowMutationEntry::new("PDX#2022-09-14#3").set_cell("sensor", "windspeed", "12"));
            store.bulk_mutate(mutation)?;
            store.close()?;
        }

        let store = FileStore::open(&path)?;
        let row = store.read_row("weather", "PDX#2022-09-14#3")?.unwrap();
        assert_eq!(row.cell_value("windspeed"), Some("12"));
        Ok(())
    }

    #[test]
    fn test_missing_directory_is_connection_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing").join("store.json");
        assert!(matches!(
            FileStore::open(&path),
            Err(ProcessingError::Connection(_))
        ));
    }

    #[test]
    fn test_corrupt_snapshot_is_connection_failure() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("store.json");
        std::fs::write(&path, "not json")?;

        assert!(matches!(
            FileStore::open(&path),
            Err(ProcessingError::Connection(_))
        ));
        Ok(())
    }

    #[test]
    fn test_read_only_session_leaves_no_snapshot() -> Result<()> {
        let dir = TempDir::new()?;
        let path = dir.path().join("store.json");

        let mut store = FileStore::open(&path)?;
        let err = store.read_rows("weather", &Query::all()).unwrap_err();
        assert!(err.is_table_not_found());
        store.close()?;
        drop(store);

        assert!(!path.exists());
        Ok(())
    }

    #[test]
    fn test_closed_store_rejects_calls() -> Result<()> {
        let dir = TempDir::new()?;
        let mut store = FileStore::open(&dir.path().join("store.json"))?;
        store.close()?;
        store.close()?;
        assert!(matches!(
            store.read_rows("weather", &Query::all()),
            Err(ProcessingError::StoreClosed)
        ));
        Ok(())
    }
}
