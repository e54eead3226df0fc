//! The single authority over the to-do collection and its file on disk.
//!
//! Every mutating call applies the change in memory and then rewrites the
//! whole document before returning. Not-found ids and blank names/titles are
//! not errors: they come back as `false` / `None`. `Err` is reserved for
//! failed saves, after which the in-memory change is kept and the file still
//! holds the previous document until the next successful save.
//!
//! One process is assumed to own the data file. Nothing arbitrates between
//! processes; concurrent writers race on the final rename and the last one
//! wins.

use crate::config::{Config, ConfigError};
use crate::models::{StorageData, Task, TodoList};
use thiserror::Error;

pub mod json;
#[cfg(test)]
pub(crate) mod test_utils;

pub use json::JsonStorage;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Reads and writes the complete document in one go.
pub trait Backend {
    fn load(&self) -> Result<StorageData, StorageError>;
    fn save(&self, data: &StorageData) -> Result<(), StorageError>;
}

pub struct Storage<B: Backend = JsonStorage> {
    backend: B,
    lists: Vec<TodoList>,
}

impl Storage<JsonStorage> {
    /// Resolves the data directory, creates it if needed and loads `data.json`.
    pub fn open(config: &Config) -> Result<Self, StorageError> {
        let data_dir = config.data_dir()?;
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self::with_backend(JsonStorage::new(data_dir)))
    }

    pub fn data_file(&self) -> &std::path::Path {
        self.backend.path()
    }
}

impl<B: Backend> Storage<B> {
    /// Loads from `backend`. A document that cannot be read or parsed is
    /// logged and replaced by an empty collection; the file is left as is
    /// until the next save overwrites it.
    pub fn with_backend(backend: B) -> Self {
        let lists = match backend.load() {
            Ok(data) => data.lists,
            Err(e) => {
                log::warn!("Ignoring unreadable to-do data, starting empty: {}", e);
                Vec::new()
            }
        };
        Self { backend, lists }
    }

    fn save(&self) -> Result<(), StorageError> {
        let data = StorageData {
            lists: self.lists.clone(),
        };
        self.backend.save(&data)
    }

    fn find_list_mut(&mut self, list_id: &str) -> Option<&mut TodoList> {
        self.lists.iter_mut().find(|l| l.id == list_id)
    }

    pub fn get_lists(&self) -> Vec<TodoList> {
        self.lists.clone()
    }

    pub fn get_list(&self, list_id: &str) -> Option<TodoList> {
        self.lists.iter().find(|l| l.id == list_id).cloned()
    }

    /// Creates a list at the end of the collection. A missing or blank name
    /// becomes `List N` with the smallest unused positive `N`.
    pub fn create_list(&mut self, name: Option<&str>) -> Result<TodoList, StorageError> {
        let name = match name.map(str::trim).filter(|n| !n.is_empty()) {
            Some(name) => name.to_string(),
            None => next_auto_name(&self.lists),
        };

        let list = TodoList::new(name);
        self.lists.push(list.clone());
        self.save()?;
        log::info!("Created list {:?} ({})", list.name, list.id);
        Ok(list)
    }

    /// Deletes the list and all of its tasks.
    pub fn delete_list(&mut self, list_id: &str) -> Result<bool, StorageError> {
        let Some(index) = self.lists.iter().position(|l| l.id == list_id) else {
            log::debug!("delete_list: no list {}", list_id);
            return Ok(false);
        };
        self.lists.remove(index);
        self.save()?;
        Ok(true)
    }

    pub fn rename_list(&mut self, list_id: &str, new_name: &str) -> Result<bool, StorageError> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            log::debug!("rename_list: blank name for {}", list_id);
            return Ok(false);
        }
        let Some(list) = self.find_list_mut(list_id) else {
            log::debug!("rename_list: no list {}", list_id);
            return Ok(false);
        };
        list.name = new_name.to_string();
        self.save()?;
        Ok(true)
    }

    pub fn add_task(&mut self, list_id: &str, title: &str) -> Result<Option<Task>, StorageError> {
        let title = title.trim();
        if title.is_empty() {
            log::debug!("add_task: blank title for list {}", list_id);
            return Ok(None);
        }
        let Some(list) = self.find_list_mut(list_id) else {
            log::debug!("add_task: no list {}", list_id);
            return Ok(None);
        };
        let task = list.add_task(title).clone();
        self.save()?;
        Ok(Some(task))
    }

    pub fn update_task(
        &mut self,
        list_id: &str,
        task_id: &str,
        title: &str,
    ) -> Result<bool, StorageError> {
        let title = title.trim();
        if title.is_empty() {
            log::debug!("update_task: blank title for task {}", task_id);
            return Ok(false);
        }
        let Some(task) = self
            .find_list_mut(list_id)
            .and_then(|l| l.get_task_mut(task_id))
        else {
            log::debug!("update_task: no task {} in list {}", task_id, list_id);
            return Ok(false);
        };
        task.title = title.to_string();
        self.save()?;
        Ok(true)
    }

    pub fn delete_task(&mut self, list_id: &str, task_id: &str) -> Result<bool, StorageError> {
        let removed = self
            .find_list_mut(list_id)
            .is_some_and(|l| l.remove_task(task_id));
        if !removed {
            log::debug!("delete_task: no task {} in list {}", task_id, list_id);
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    pub fn toggle_task(&mut self, list_id: &str, task_id: &str) -> Result<bool, StorageError> {
        let Some(task) = self
            .find_list_mut(list_id)
            .and_then(|l| l.get_task_mut(task_id))
        else {
            log::debug!("toggle_task: no task {} in list {}", task_id, list_id);
            return Ok(false);
        };
        task.toggle();
        self.save()?;
        Ok(true)
    }
}

const AUTO_NAME_PREFIX: &str = "List ";

fn next_auto_name(lists: &[TodoList]) -> String {
    let used: std::collections::HashSet<i64> = lists
        .iter()
        .filter_map(|l| l.name.strip_prefix(AUTO_NAME_PREFIX))
        .filter_map(|suffix| suffix.trim().parse().ok())
        .collect();

    let n = (1..).find(|n| !used.contains(n)).unwrap_or(1);
    format!("{}{}", AUTO_NAME_PREFIX, n)
}
