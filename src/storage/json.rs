use super::{Backend, StorageError};
use crate::models::StorageData;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

pub const DATA_FILE_NAME: &str = "data.json";

/// Whole-document JSON storage at `<data_dir>/data.json`.
pub struct JsonStorage {
    path: PathBuf,
}

impl JsonStorage {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            path: data_dir.as_ref().join(DATA_FILE_NAME),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

impl Backend for JsonStorage {
    fn load(&self) -> Result<StorageData, StorageError> {
        if !self.path.exists() {
            log::debug!("No data file at {}, starting empty", self.path.display());
            return Ok(StorageData::new());
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let value: serde_json::Value = serde_json::from_str(&contents)?;
        let data = StorageData::from_value(value)?;
        log::info!(
            "Loaded {} list(s) from {}",
            data.lists.len(),
            self.path.display()
        );
        Ok(data)
    }

    fn save(&self, data: &StorageData) -> Result<(), StorageError> {
        std::fs::create_dir_all(self.dir())?;

        let json = serde_json::to_string_pretty(&data.to_value()?)?;
        write_atomically(&self.path, |file| file.write_all(json.as_bytes()))?;

        log::debug!(
            "Saved {} list(s) to {}",
            data.lists.len(),
            self.path.display()
        );
        Ok(())
    }
}

/// Writes `target` by filling a temporary sibling file and renaming it into
/// place. Readers see either the old or the new content, never a mix. The
/// temporary file is removed whenever this returns an error.
pub fn write_atomically<F>(target: &Path, write: F) -> Result<(), StorageError>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let dir = target.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::Builder::new()
        .prefix(".data-")
        .suffix(".tmp")
        .tempfile_in(dir)?;

    write(tmp.as_file_mut())?;
    tmp.as_file_mut().flush()?;
    tmp.as_file().sync_all()?;

    tmp.persist(target).map_err(|e| StorageError::Io(e.error))?;
    Ok(())
}
