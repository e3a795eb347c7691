use crate::error::StoreError;
use crate::results::ProductRecord;
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use std::collections::HashSet;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// JSON file holding every product seen across scrape runs, unique by title
#[derive(Debug, Clone)]
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the catalog; a missing file is an empty catalog
    pub fn load(&self) -> Result<Vec<ProductRecord>, StoreError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(self.io_error(e)),
        };

        serde_json::from_str(&contents).map_err(|source| StoreError::Parse {
            path: self.path.display().to_string(),
            source,
        })
    }

    /// Appends records whose titles are not yet in the catalog and rewrites it.
    ///
    /// Existing entries are never updated, even when a newer scrape reports a
    /// different price. Duplicate titles within `records` keep the first one.
    pub fn merge_and_save(&self, records: &[ProductRecord]) -> Result<PathBuf, StoreError> {
        let mut catalog = self.load()?;
        let before = catalog.len();

        let mut titles: HashSet<String> = catalog.iter().map(|r| r.title.clone()).collect();
        for record in records {
            if titles.insert(record.title.clone()) {
                catalog.push(record.clone());
            }
        }

        ::log::info!(
            "Adding {} new products to {} ({} already stored)",
            catalog.len() - before,
            self.path.display(),
            before
        );

        self.write(&catalog)?;
        Ok(self.path.clone())
    }

    fn write(&self, catalog: &[ProductRecord]) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| self.io_error(e))?;

        // Written beside the catalog, then renamed over it once complete
        let mut temp_file = NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        {
            let mut writer = BufWriter::new(temp_file.as_file_mut());
            let formatter = PrettyFormatter::with_indent(b"    ");
            let mut ser = serde_json::Serializer::with_formatter(&mut writer, formatter);
            catalog
                .serialize(&mut ser)
                .map_err(|e| self.io_error(e.into()))?;
            writer.flush().map_err(|e| self.io_error(e))?;
        }

        temp_file
            .persist(&self.path)
            .map_err(|e| self.io_error(e.error))?;
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }
}
