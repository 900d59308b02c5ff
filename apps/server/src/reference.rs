//! Reference table loaded from a CSV file on disk.

use async_trait::async_trait;
use ferrum_labs::{ReferenceRow, ReferenceSource};
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ReferenceSource for CsvFileSource {
    async fn load_rows(&self) -> ferrum_labs::Result<Vec<ReferenceRow>> {
        let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
            ferrum_labs::Error::ReferenceSource(format!("{}: {e}", self.path.display()))
        })?;
        ReferenceRow::read_csv(bytes.as_slice())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
