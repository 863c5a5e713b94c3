//! Destination for the output tables.

use crate::types::columns::{LATITUDE, LONGITUDE};
use crate::utils::{ensure_dir_exists, get_output_dir};
use async_trait::async_trait;
use log::{info, warn};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::task;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to determine output directory")]
    DirResolution,

    #[error("I/O error on '{0}'")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("Failed to read or write table '{0}'")]
    Polars(PathBuf, #[source] PolarsError),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] task::JoinError),
}

/// Appends tables to named destinations. Rows whose `(latitude, longitude)` key is already
/// stored are skipped, so re-running a load is harmless.
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Appends `frame` to `table` and returns the number of rows actually written.
    async fn append(&self, table: &str, frame: &DataFrame) -> Result<usize, SinkError>;
}

/// [`RecordSink`] keeping each table in `<dir>/<table>.parquet`.
pub struct ParquetSink {
    dir: PathBuf,
}

impl ParquetSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// A sink writing into the platform data directory.
    pub fn in_default_dir() -> Result<Self, SinkError> {
        Ok(Self::new(get_output_dir()?))
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.parquet"))
    }
}

#[async_trait]
impl RecordSink for ParquetSink {
    async fn append(&self, table: &str, frame: &DataFrame) -> Result<usize, SinkError> {
        ensure_dir_exists(&self.dir).await?;
        let path = self.table_path(table);
        let frame = frame.clone();
        let table_name = table.to_string();

        let written = task::spawn_blocking(move || append_parquet(&path, frame)).await??;
        info!("Loaded {} records to table {}.", written, table_name);
        Ok(written)
    }
}

fn append_parquet(path: &Path, frame: DataFrame) -> Result<usize, SinkError> {
    let (mut combined, written) = if path.exists() {
        let incoming = frame.height();
        let existing = LazyFrame::scan_parquet(path, Default::default())
            .and_then(|lf| lf.collect())
            .map_err(|e| SinkError::Polars(path.to_path_buf(), e))?;
        let key = [col(LATITUDE), col(LONGITUDE)];
        let fresh = frame
            .lazy()
            .join(
                existing.clone().lazy().select(key.clone()),
                key.clone(),
                key,
                JoinArgs::new(JoinType::Anti),
            )
            .collect()
            .map_err(|e| SinkError::Polars(path.to_path_buf(), e))?;
        let written = fresh.height();
        if written < incoming {
            warn!(
                "New records violating the key of {:?}, skipping {} of them",
                path,
                incoming - written
            );
        }
        let combined = existing
            .vstack(&fresh)
            .map_err(|e| SinkError::Polars(path.to_path_buf(), e))?;
        (combined, written)
    } else {
        let written = frame.height();
        (frame, written)
    };

    // Write next to the target and swap, the old file stays intact if writing fails.
    let staging = path.with_extension("parquet.tmp");
    let file =
        std::fs::File::create(&staging).map_err(|e| SinkError::Io(staging.clone(), e))?;
    ParquetWriter::new(file)
        .with_compression(ParquetCompression::Snappy)
        .finish(&mut combined)
        .map_err(|e| SinkError::Polars(staging.clone(), e))?;
    std::fs::rename(&staging, path).map_err(|e| SinkError::Io(path.to_path_buf(), e))?;
    Ok(written)
}
