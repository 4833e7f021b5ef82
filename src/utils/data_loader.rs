//! Data loading and result writing

use crate::error::{CurveError, Result};
use polars::prelude::*;
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// CSV loader for evaluation datasets
#[derive(Debug, Clone)]
pub struct DataLoader {
    /// Rows used to infer column types
    infer_schema_length: Option<usize>,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    pub fn new() -> Self {
        Self {
            infer_schema_length: Some(1000),
        }
    }

    /// Rows scanned for type inference; `None` scans the whole file
    pub fn with_infer_schema_length(mut self, rows: Option<usize>) -> Self {
        self.infer_schema_length = rows;
        self
    }

    /// Load a CSV file with a header row
    pub fn load_csv(&self, path: &Path) -> Result<DataFrame> {
        let start = Instant::now();
        let file = File::open(path).map_err(|e| {
            CurveError::DataError(format!("cannot open {}: {}", path.display(), e))
        })?;

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| CurveError::DataError(format!("cannot parse {}: {}", path.display(), e)))?;

        info!(
            path = %path.display(),
            rows = df.height(),
            cols = df.width(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded dataset"
        );
        Ok(df)
    }
}

/// Writers for result tables and run manifests
pub struct DataSaver;

impl DataSaver {
    /// Write `df` as CSV with a header row, creating parent directories
    pub fn save_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
        Self::ensure_parent(path)?;
        let mut file = File::create(path)?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(df)
            .map_err(|e| CurveError::DataError(e.to_string()))?;

        debug!(path = %path.display(), rows = df.height(), "Wrote CSV");
        Ok(())
    }

    /// Write any serializable value as pretty-printed JSON
    pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
        Self::ensure_parent(path)?;
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, value)?;

        debug!(path = %path.display(), "Wrote JSON");
        Ok(())
    }

    fn ensure_parent(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}
