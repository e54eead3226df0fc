use super::json::{JsonStorage, DATA_FILE_NAME};
use super::{Backend, Storage, StorageError};
use crate::config::Config;
use crate::models::StorageData;
use std::path::PathBuf;
use tempfile::TempDir;

/// A `Storage` rooted in its own temporary data directory.
pub struct TestStorage {
    temp_dir: TempDir,
    storage: Storage<JsonStorage>,
}

impl TestStorage {
    pub fn new() -> Self {
        let temp_dir = tempfile::Builder::new()
            .prefix("simple_todo_test")
            .tempdir()
            .expect("Failed to create temporary directory");

        let config = Config::with_data_dir(temp_dir.path().to_string_lossy());
        let storage = Storage::open(&config).expect("Failed to open test storage");

        Self { temp_dir, storage }
    }

    pub fn storage(&self) -> &Storage<JsonStorage> {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut Storage<JsonStorage> {
        &mut self.storage
    }

    /// A second, independent `Storage` loaded from the same directory.
    pub fn reopen(&self) -> Storage<JsonStorage> {
        Storage::with_backend(JsonStorage::new(self.temp_dir.path()))
    }

    pub fn data_file(&self) -> PathBuf {
        self.temp_dir.path().join(DATA_FILE_NAME)
    }
}

/// Loads an empty document and refuses every save.
pub struct FailingBackend;

impl Backend for FailingBackend {
    fn load(&self) -> Result<StorageData, StorageError> {
        Ok(StorageData::new())
    }

    fn save(&self, _data: &StorageData) -> Result<(), StorageError> {
        Err(StorageError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only test backend",
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_initialization() {
        let test_storage = TestStorage::new();
        assert!(test_storage.storage().get_lists().is_empty());
        assert_eq!(
            test_storage.storage().data_file(),
            test_storage.data_file().as_path()
        );
    }

    #[test]
    fn test_reopen_sees_saved_lists() {
        let mut test_storage = TestStorage::new();
        let list = test_storage
            .storage_mut()
            .create_list(Some("Test"))
            .expect("Failed to create list");

        let reopened = test_storage.reopen();
        assert_eq!(reopened.get_lists(), vec![list]);
    }
}
