//! Durable storage port and adapters for the task list.
//!
//! # Responsibility
//! - Define the load/save contract the store mirrors every mutation through.
//! - Keep file format and I/O details out of the store.
//!
//! # Invariants
//! - Saves are whole-list overwrites in display order.
//! - A decoded list never contains two tasks with the same id.

use crate::model::task::{Task, TaskId};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStorage;
pub use memory::MemoryStorage;

pub type StorageResult<T> = Result<T, StorageError>;

/// Failures raised by storage adapters.
#[derive(Debug)]
pub enum StorageError {
    Io(std::io::Error),
    Decode(serde_json::Error),
    Encode(serde_json::Error),
    DuplicateId(TaskId),
    /// Adapter refused the write (used by in-memory failure injection).
    WriteRejected,
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "task file I/O failed: {err}"),
            Self::Decode(err) => write!(f, "task file is not a valid task list: {err}"),
            Self::Encode(err) => write!(f, "failed to encode task list: {err}"),
            Self::DuplicateId(id) => write!(f, "duplicate task id in task file: {id}"),
            Self::WriteRejected => write!(f, "storage rejected the write"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Decode(err) | Self::Encode(err) => Some(err),
            Self::DuplicateId(_) | Self::WriteRejected => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

/// Storage contract for the ordered task list.
pub trait TaskStorage {
    /// Reads the stored list.
    ///
    /// Returns `Ok(None)` when nothing has been stored yet.
    fn load(&self) -> StorageResult<Option<Vec<Task>>>;

    /// Replaces the stored list with `tasks`.
    fn save(&self, tasks: &[Task]) -> StorageResult<()>;
}

/// Decodes a serialized task list, treating blank input as "nothing stored".
pub(crate) fn decode_tasks(content: &str) -> StorageResult<Option<Vec<Task>>> {
    if content.trim().is_empty() {
        return Ok(None);
    }

    let tasks: Vec<Task> = serde_json::from_str(content).map_err(StorageError::Decode)?;
    let mut seen = HashSet::with_capacity(tasks.len());
    for task in &tasks {
        if !seen.insert(task.id) {
            return Err(StorageError::DuplicateId(task.id));
        }
    }
    Ok(Some(tasks))
}

pub(crate) fn encode_tasks(tasks: &[Task]) -> StorageResult<String> {
    serde_json::to_string_pretty(tasks).map_err(StorageError::Encode)
}
