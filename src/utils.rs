use crate::sink::SinkError;
use std::io;
use std::path::{Path, PathBuf};

const OUTPUT_DIR_NAME: &str = "weather_insights";

/// Default location for the output tables, under the platform data directory.
pub fn get_output_dir() -> Result<PathBuf, SinkError> {
    dirs::data_dir()
        .ok_or(SinkError::DirResolution)
        .map(|p| p.join(OUTPUT_DIR_NAME))
}

pub async fn ensure_dir_exists(path: &Path) -> Result<(), SinkError> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) if metadata.is_dir() => Ok(()),
        Ok(_) => Err(SinkError::Io(
            path.to_path_buf(),
            io::Error::new(io::ErrorKind::AlreadyExists, "path exists but is not a directory"),
        )),
        Err(e) if e.kind() == io::ErrorKind::NotFound => tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| SinkError::Io(path.to_path_buf(), e)),
        Err(e) => Err(SinkError::Io(path.to_path_buf(), e)),
    }
}
