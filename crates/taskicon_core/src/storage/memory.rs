//! In-memory storage adapter.
//!
//! Keeps the serialized JSON text rather than the task values, so code that
//! runs against it exercises the same encode/decode path as the file adapter.

use super::{decode_tasks, encode_tasks, StorageError, StorageResult, TaskStorage};
use crate::model::task::Task;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryState {
    content: Option<String>,
    writes: usize,
    fail_writes: bool,
}

/// Task storage held in process memory.
///
/// Clones share the same backing state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates storage pre-populated with raw serialized content.
    pub fn with_content(content: impl Into<String>) -> Self {
        let storage = Self::default();
        storage.lock().content = Some(content.into());
        storage
    }

    /// Last successfully written content, if any.
    pub fn content(&self) -> Option<String> {
        self.lock().content.clone()
    }

    /// Number of successful saves.
    pub fn write_count(&self) -> usize {
        self.lock().writes
    }

    /// Makes subsequent saves fail with `StorageError::WriteRejected`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TaskStorage for MemoryStorage {
    fn load(&self) -> StorageResult<Option<Vec<Task>>> {
        match self.lock().content.as_deref() {
            Some(content) => decode_tasks(content),
            None => Ok(None),
        }
    }

    fn save(&self, tasks: &[Task]) -> StorageResult<()> {
        let content = encode_tasks(tasks)?;
        let mut state = self.lock();
        if state.fail_writes {
            return Err(StorageError::WriteRejected);
        }
        state.content = Some(content);
        state.writes += 1;
        Ok(())
    }
}
