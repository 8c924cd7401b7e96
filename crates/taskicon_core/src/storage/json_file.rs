//! JSON file adapter for task persistence.
//!
//! # Responsibility
//! - Mirror the task list to one pretty-printed JSON array on disk.
//! - Set aside unreadable files so a later save does not silently erase them.
//!
//! # Invariants
//! - Saves overwrite the whole file; there is no append path.
//! - A missing or blank file loads as "nothing stored".

use super::{decode_tasks, encode_tasks, StorageError, StorageResult, TaskStorage};
use crate::model::task::Task;
use log::{debug, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const CORRUPT_SUFFIX: &str = "corrupt";

/// Task storage backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Location an unreadable task file is copied to before it is overwritten.
    pub fn corrupt_copy_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".");
        name.push(CORRUPT_SUFFIX);
        self.path.with_file_name(name)
    }

    fn preserve_corrupt_copy(&self) {
        let target = self.corrupt_copy_path();
        match fs::copy(&self.path, &target) {
            Ok(_) => warn!(
                "event=task_file_quarantine module=storage status=ok path={}",
                target.display()
            ),
            Err(err) => warn!(
                "event=task_file_quarantine module=storage status=error path={} error={}",
                target.display(),
                err
            ),
        }
    }
}

impl TaskStorage for JsonFileStorage {
    fn load(&self) -> StorageResult<Option<Vec<Task>>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(
                    "event=task_file_load module=storage status=missing path={}",
                    self.path.display()
                );
                return Ok(None);
            }
            Err(err) => return Err(err.into()),
        };

        let content = match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(err) => {
                self.preserve_corrupt_copy();
                return Err(std::io::Error::new(ErrorKind::InvalidData, err).into());
            }
        };

        match decode_tasks(&content) {
            Ok(tasks) => Ok(tasks),
            Err(err) => {
                self.preserve_corrupt_copy();
                Err(err)
            }
        }
    }

    fn save(&self, tasks: &[Task]) -> StorageResult<()> {
        let content = encode_tasks(tasks)?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, content).map_err(StorageError::Io)
    }
}

#[cfg(test)]
mod tests {
    use super::JsonFileStorage;
    use crate::model::task::{Task, TaskKind};
    use crate::storage::{StorageError, TaskStorage};
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn load_missing_file_returns_none() {
        let dir = tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("tasks.json"));

        assert!(storage.load().unwrap().is_none());
    }

    #[test]
    fn save_creates_parent_directory_and_roundtrips() {
        let dir = tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("nested").join("tasks.json"));
        let mut done = Task::new("water plants", TaskKind::RepeatDaily);
        done.toggle();
        let tasks = vec![Task::new("buy milk", TaskKind::OneTime), done];

        storage.save(&tasks).unwrap();
        let loaded = storage.load().unwrap().unwrap();

        assert_eq!(loaded, tasks);
    }

    #[test]
    fn save_empty_list_writes_empty_array() {
        let dir = tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("tasks.json"));

        storage.save(&[]).unwrap();

        let content = fs::read_to_string(storage.path()).unwrap();
        assert_eq!(content.trim(), "[]");
    }

    #[test]
    fn load_invalid_json_errors_and_keeps_corrupt_copy() {
        let dir = tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("tasks.json"));
        fs::write(storage.path(), "{ not a task list").unwrap();

        let err = storage.load().unwrap_err();

        assert!(matches!(err, StorageError::Decode(_)));
        let copy = fs::read_to_string(storage.corrupt_copy_path()).unwrap();
        assert_eq!(copy, "{ not a task list");
    }

    #[test]
    fn load_non_utf8_bytes_errors_and_keeps_corrupt_copy() {
        let dir = tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path().join("tasks.json"));
        let raw: &[u8] = b"[{\"title\": \"caf\xe9\"}]";
        fs::write(storage.path(), raw).unwrap();

        let err = storage.load().unwrap_err();

        assert!(
            matches!(&err, StorageError::Io(io) if io.kind() == std::io::ErrorKind::InvalidData)
        );
        assert_eq!(fs::read(storage.corrupt_copy_path()).unwrap(), raw);
    }

    #[test]
    fn save_into_directory_path_fails_with_io_error() {
        let dir = tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path());

        let err = storage.save(&[]).unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
    }
}
