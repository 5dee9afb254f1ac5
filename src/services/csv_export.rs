use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use uuid::Uuid;

use crate::domain::{StageError, StockRow};

/// A generated CSV in the temp directory. The file lives as long as this
/// handle does.
#[derive(Debug)]
pub struct CsvFile {
    path: PathBuf,
}

impl CsvFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for CsvFile {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.path) {
            Ok(_) => log::info!("Removed csv file {:?}", self.path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::error!("Failed to remove csv file {:?}: {:?}", self.path, e),
        }
    }
}

pub fn generate_csv(data: &[StockRow]) -> Result<CsvFile, StageError> {
    write_csv(data).map_err(|e| StageError::from_anyhow("generate_csv", e))
}

fn write_csv(data: &[StockRow]) -> anyhow::Result<CsvFile> {
    if data.is_empty() {
        bail!("The list data is empty");
    }

    let path = std::env::temp_dir().join(format!("{}.csv", Uuid::new_v4()));
    // Owned from here on so a failed write does not leave a stray file.
    let file = CsvFile { path };

    let mut writer = csv::Writer::from_path(file.path())
        .with_context(|| format!("Failed to create {:?}", file.path()))?;
    for row in data {
        writer.serialize(row)?;
    }
    writer.flush()?;

    log::info!("Wrote {} rows to {:?}", data.len(), file.path());

    Ok(file)
}
