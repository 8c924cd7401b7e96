//! Task store: the in-memory task list mirrored to durable storage.
//!
//! # Responsibility
//! - Own the ordered task list and every mutation applied to it.
//! - Persist after each mutation and notify subscribers.
//! - Apply the daily reset pass to recurring tasks.
//!
//! # Invariants
//! - Task ids are unique within the store at all times.
//! - Insertion order is display and persistence order; nothing re-sorts.
//! - Unknown ids are no-ops, never errors.
//! - Storage failures never escape: load degrades to an empty list, and a
//!   failed save leaves in-memory state as the source of truth.

mod events;

pub use events::{StoreEvent, SubscriptionId};

use crate::model::task::{Task, TaskId, TaskKind, TaskValidationError};
use crate::storage::TaskStorage;
use events::Subscribers;
use log::{info, warn};
use std::sync::{Arc, Mutex, MutexGuard};

/// Store shared between a UI host and the daily reset scheduler.
pub type SharedTaskStore<S> = Arc<Mutex<TaskStore<S>>>;

/// Locks a shared store, recovering the guard if a previous holder panicked.
pub fn lock_store<S: TaskStorage>(store: &SharedTaskStore<S>) -> MutexGuard<'_, TaskStore<S>> {
    store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Read-only copy of store state for presentation layers.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreSnapshot {
    pub tasks: Vec<Task>,
    pub progress: f64,
}

/// Ordered task collection with write-through persistence.
pub struct TaskStore<S: TaskStorage> {
    storage: S,
    tasks: Vec<Task>,
    subscribers: Subscribers,
    last_progress: f64,
}

impl<S: TaskStorage> TaskStore<S> {
    /// Loads the stored task list and rewrites it once in normalized form.
    ///
    /// A missing file yields an empty store without writing. An unreadable
    /// file yields an empty store and is left for the next mutation to
    /// overwrite.
    pub fn open(storage: S) -> Self {
        let tasks = match storage.load() {
            Ok(Some(tasks)) => {
                info!(
                    "event=store_load module=store status=ok task_count={}",
                    tasks.len()
                );
                if let Err(err) = storage.save(&tasks) {
                    warn!(
                        "event=store_save module=store status=error trigger=load error={}",
                        err
                    );
                }
                tasks
            }
            Ok(None) => {
                info!("event=store_load module=store status=empty");
                Vec::new()
            }
            Err(err) => {
                warn!(
                    "event=store_load module=store status=error fallback=empty error={}",
                    err
                );
                Vec::new()
            }
        };

        let mut store = Self {
            storage,
            tasks,
            subscribers: Subscribers::default(),
            last_progress: 0.0,
        };
        store.last_progress = store.progress();
        store
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Current tasks in stored order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|task| task.is_completed).count()
    }

    /// Fraction of tasks completed, in `[0, 1]`; `0.0` for an empty store.
    pub fn progress(&self) -> f64 {
        if self.tasks.is_empty() {
            return 0.0;
        }
        self.completed_count() as f64 / self.tasks.len() as f64
    }

    pub fn snapshot(&self) -> StoreSnapshot {
        StoreSnapshot {
            tasks: self.tasks.clone(),
            progress: self.progress(),
        }
    }

    /// Appends a new incomplete task and returns its id.
    ///
    /// Duplicate titles are allowed.
    ///
    /// # Errors
    /// - `EmptyTitle` when `title` is empty or whitespace-only.
    pub fn add(
        &mut self,
        title: impl Into<String>,
        kind: TaskKind,
    ) -> Result<TaskId, TaskValidationError> {
        let task = Task::new(title, kind);
        task.validate()?;
        let id = task.id;
        self.tasks.push(task);
        info!(
            "event=task_add module=store status=ok kind={} task_count={}",
            kind,
            self.tasks.len()
        );
        self.commit();
        Ok(id)
    }

    /// Removes the task with `id`. Returns `false` when no such task exists.
    pub fn delete(&mut self, id: TaskId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        self.tasks.remove(index);
        info!(
            "event=task_delete module=store status=ok task_count={}",
            self.tasks.len()
        );
        self.commit();
        true
    }

    /// Replaces the title of the task with `id`, leaving other fields intact.
    pub fn edit(&mut self, id: TaskId, new_title: impl Into<String>) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        self.tasks[index].title = new_title.into();
        info!("event=task_edit module=store status=ok");
        self.commit();
        true
    }

    /// Flips completion of the task with `id`.
    pub fn toggle(&mut self, id: TaskId) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        self.tasks[index].toggle();
        info!(
            "event=task_toggle module=store status=ok completed={}",
            self.tasks[index].is_completed
        );
        self.commit();
        true
    }

    /// Clears completion on every recurring task and persists unconditionally.
    ///
    /// Returns how many tasks actually changed.
    pub fn apply_daily_reset(&mut self) -> usize {
        let changed = self
            .tasks
            .iter_mut()
            .map(Task::reset_for_new_day)
            .filter(|changed| *changed)
            .count();
        info!(
            "event=daily_reset module=store status=ok reset_count={} task_count={}",
            changed,
            self.tasks.len()
        );
        self.commit();
        changed
    }

    /// Registers a callback invoked after every mutation.
    pub fn subscribe(
        &mut self,
        callback: impl FnMut(&StoreEvent) + Send + 'static,
    ) -> SubscriptionId {
        self.subscribers.insert(Box::new(callback))
    }

    /// Removes a callback. Returns `false` for an unknown id.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.subscribers.remove(id)
    }

    fn position(&self, id: TaskId) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    fn commit(&mut self) {
        self.persist();

        let progress = self.progress();
        let crossed = progress >= 1.0 && self.last_progress < 1.0;
        self.last_progress = progress;

        self.subscribers
            .emit(&StoreEvent::TasksChanged { progress });
        if crossed {
            info!("event=all_completed module=store status=ok");
            self.subscribers.emit(&StoreEvent::AllCompleted);
        }
    }

    fn persist(&self) {
        if let Err(err) = self.storage.save(&self.tasks) {
            warn!(
                "event=store_save module=store status=error task_count={} error={}",
                self.tasks.len(),
                err
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{StoreEvent, TaskStore};
    use crate::model::task::TaskKind;
    use crate::storage::{MemoryStorage, TaskStorage};
    use std::sync::{Arc, Mutex};

    fn recorded_events(store: &mut TaskStore<MemoryStorage>) -> Arc<Mutex<Vec<StoreEvent>>> {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        store.subscribe(move |event| sink.lock().unwrap().push(*event));
        events
    }

    #[test]
    fn open_on_empty_storage_does_not_write() {
        let storage = MemoryStorage::new();
        let store = TaskStore::open(storage.clone());

        assert!(store.is_empty());
        assert_eq!(storage.write_count(), 0);
    }

    #[test]
    fn open_rewrites_successfully_loaded_list_once() {
        let seed = MemoryStorage::new();
        {
            let mut store = TaskStore::open(seed.clone());
            store.add("stretch", TaskKind::RepeatDaily).unwrap();
        }
        let content = seed.content().unwrap();
        let storage = MemoryStorage::with_content(content.replace('\n', " "));

        let store = TaskStore::open(storage.clone());

        assert_eq!(store.len(), 1);
        assert_eq!(storage.write_count(), 1);
        assert_eq!(storage.content().unwrap(), content);
    }

    #[test]
    fn open_corrupt_storage_starts_empty_without_rewrite() {
        let storage = MemoryStorage::with_content("[{\"id\": 42}]");
        let store = TaskStore::open(storage.clone());

        assert!(store.is_empty());
        assert_eq!(storage.write_count(), 0);
        assert_eq!(storage.content().unwrap(), "[{\"id\": 42}]");
    }

    #[test]
    fn add_rejects_blank_title_without_persisting() {
        let storage = MemoryStorage::new();
        let mut store = TaskStore::open(storage.clone());

        assert!(store.add(" \t ", TaskKind::OneTime).is_err());
        assert!(store.is_empty());
        assert_eq!(storage.write_count(), 0);
    }

    #[test]
    fn every_successful_mutation_persists() {
        let storage = MemoryStorage::new();
        let mut store = TaskStore::open(storage.clone());

        let id = store.add("buy milk", TaskKind::OneTime).unwrap();
        store.toggle(id);
        store.edit(id, "buy oat milk");
        store.apply_daily_reset();
        store.delete(id);

        assert_eq!(storage.write_count(), 5);
        assert_eq!(storage.load().unwrap().unwrap(), Vec::new());
    }

    #[test]
    fn write_failure_keeps_in_memory_state() {
        let storage = MemoryStorage::new();
        let mut store = TaskStore::open(storage.clone());
        storage.set_fail_writes(true);

        let id = store.add("offline task", TaskKind::OneTime).unwrap();
        assert!(store.toggle(id));

        assert_eq!(store.len(), 1);
        assert!(store.get(id).unwrap().is_completed);
        assert!(storage.content().is_none());
    }

    #[test]
    fn completion_event_fires_only_on_crossing() {
        let mut store = TaskStore::open(MemoryStorage::new());
        let events = recorded_events(&mut store);

        let first = store.add("a", TaskKind::OneTime).unwrap();
        store.toggle(first);
        store.edit(first, "a2");
        let second = store.add("b", TaskKind::OneTime).unwrap();
        store.toggle(second);

        let completions = events
            .lock()
            .unwrap()
            .iter()
            .filter(|event| **event == StoreEvent::AllCompleted)
            .count();
        assert_eq!(completions, 2);
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let mut store = TaskStore::open(MemoryStorage::new());
        let events = Arc::new(Mutex::new(0_usize));
        let sink = Arc::clone(&events);
        let id = store.subscribe(move |_| *sink.lock().unwrap() += 1);

        store.add("a", TaskKind::OneTime).unwrap();
        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.add("b", TaskKind::OneTime).unwrap();

        assert_eq!(*events.lock().unwrap(), 1);
    }

    #[test]
    fn tasks_changed_carries_fresh_progress() {
        let mut store = TaskStore::open(MemoryStorage::new());
        let events = recorded_events(&mut store);

        let id = store.add("a", TaskKind::OneTime).unwrap();
        store.add("b", TaskKind::OneTime).unwrap();
        store.toggle(id);

        let last = *events.lock().unwrap().last().unwrap();
        assert_eq!(last, StoreEvent::TasksChanged { progress: 0.5 });
    }
}
