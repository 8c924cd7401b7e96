//! FFI use-case API for the menu-bar UI.
//!
//! # Responsibility
//! - Expose the task store to Dart via FRB as sync, use-case-level calls.
//! - Own the single store instance for this process and its reset timer.
//! - Surface the "all tasks completed" crossing to the UI.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Unknown task ids are reported as successful no-ops.
//! - Titles are trimmed here; blank titles never reach the store.

use chrono::SecondsFormat;
use log::warn;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};
use taskicon_core::config::resolve_tasks_path;
use taskicon_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    DailyResetTimer, JsonFileStorage, StoreEvent, SystemClock, Task, TaskId, TaskKind, TaskStore,
};

static TASK_HOST: OnceLock<Mutex<TaskHost>> = OnceLock::new();

struct TaskHost {
    store: TaskStore<JsonFileStorage>,
    reset_timer: DailyResetTimer<SystemClock>,
    completed_flag: Arc<AtomicBool>,
}

impl TaskHost {
    fn open(path: PathBuf) -> Self {
        let mut store = TaskStore::open(JsonFileStorage::new(path));
        let completed_flag = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&completed_flag);
        store.subscribe(move |event| {
            if *event == StoreEvent::AllCompleted {
                flag.store(true, Ordering::SeqCst);
            }
        });
        Self {
            store,
            reset_timer: DailyResetTimer::new(SystemClock),
            completed_flag,
        }
    }

    fn take_all_completed(&self) -> bool {
        self.completed_flag.swap(false, Ordering::SeqCst)
    }
}

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir`.
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.trim()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Opens the process task store.
///
/// `tasks_path = None` resolves the default location (env override, then the
/// platform data directory). Other task calls open the default location
/// lazily when this was never called.
///
/// # FFI contract
/// - Idempotent for the same path.
/// - Returns empty string on success, error message when a store is already
///   open at a different path.
#[flutter_rust_bridge::frb(sync)]
pub fn init_task_store(tasks_path: Option<String>) -> String {
    let requested = resolve_tasks_path(
        tasks_path
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
            .map(std::path::Path::new),
    );
    let host = TASK_HOST.get_or_init(|| Mutex::new(TaskHost::open(requested.clone())));
    let active = lock_host(host).store.storage().path().to_path_buf();
    if active == requested {
        return String::new();
    }
    warn!("event=task_store_init module=ffi status=error error_code=path_conflict");
    format!(
        "task store already open at `{}`; refusing to switch to `{}`",
        active.display(),
        requested.display()
    )
}

/// Task row for list rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    /// `one_time|repeat_daily`.
    pub kind: String,
    pub is_completed: bool,
    /// RFC 3339, UTC.
    pub created_at: String,
}

/// Result envelope for mutating task calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    pub ok: bool,
    /// Affected task ID; `None` on failure or no-op.
    pub task_id: Option<String>,
    pub message: String,
    /// True when this call moved progress from below 1.0 to exactly 1.0.
    pub all_completed: bool,
}

impl TaskActionResponse {
    fn success(message: impl Into<String>, task_id: TaskId, all_completed: bool) -> Self {
        Self {
            ok: true,
            task_id: Some(task_id.to_string()),
            message: message.into(),
            all_completed,
        }
    }

    fn no_op() -> Self {
        Self {
            ok: true,
            task_id: None,
            message: "No matching task; nothing changed.".to_string(),
            all_completed: false,
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            task_id: None,
            message: message.into(),
            all_completed: false,
        }
    }
}

/// Lists tasks in stored order.
#[flutter_rust_bridge::frb(sync)]
pub fn task_list() -> Vec<TaskItem> {
    with_host(|host| host.store.tasks().iter().map(to_task_item).collect())
}

/// Fraction of completed tasks, `0.0..=1.0`.
#[flutter_rust_bridge::frb(sync)]
pub fn task_progress() -> f64 {
    with_host(|host| host.store.progress())
}

/// Adds a task. `kind` accepts `one_time|repeat_daily|daily`.
///
/// # FFI contract
/// - Rejects whitespace-only titles and unknown kinds without touching storage.
#[flutter_rust_bridge::frb(sync)]
pub fn task_add(title: String, kind: String) -> TaskActionResponse {
    let title = title.trim();
    if title.is_empty() {
        return TaskActionResponse::failure("task_add failed: title is empty");
    }
    let Some(kind) = TaskKind::parse(&kind) else {
        return TaskActionResponse::failure(format!("task_add failed: unknown kind `{kind}`"));
    };

    with_host(|host| match host.store.add(title, kind) {
        Ok(id) => TaskActionResponse::success("Task added.", id, host.take_all_completed()),
        Err(err) => TaskActionResponse::failure(format!("task_add failed: {err}")),
    })
}

/// Flips completion of one task.
#[flutter_rust_bridge::frb(sync)]
pub fn task_toggle(task_id: String) -> TaskActionResponse {
    mutate_by_id("task_toggle", &task_id, "Task toggled.", |store, id| {
        store.toggle(id)
    })
}

/// Renames one task.
#[flutter_rust_bridge::frb(sync)]
pub fn task_edit(task_id: String, title: String) -> TaskActionResponse {
    let title = title.trim().to_string();
    if title.is_empty() {
        return TaskActionResponse::failure("task_edit failed: title is empty");
    }
    mutate_by_id("task_edit", &task_id, "Task renamed.", move |store, id| {
        store.edit(id, title)
    })
}

/// Deletes one task.
#[flutter_rust_bridge::frb(sync)]
pub fn task_delete(task_id: String) -> TaskActionResponse {
    mutate_by_id("task_delete", &task_id, "Task deleted.", |store, id| {
        store.delete(id)
    })
}

/// Next scheduled daily reset as Unix epoch milliseconds.
///
/// The host arms its own timer for this instant and then calls
/// `task_run_due_reset`.
#[flutter_rust_bridge::frb(sync)]
pub fn task_next_reset_epoch_ms() -> Option<i64> {
    with_host(|host| {
        host.reset_timer
            .next_fire()
            .map(|at| at.timestamp_millis())
    })
}

/// Runs the daily reset if local midnight has passed, then re-arms.
///
/// Returns whether a reset ran. Early calls are harmless no-ops.
#[flutter_rust_bridge::frb(sync)]
pub fn task_run_due_reset() -> bool {
    with_host(|host| {
        let TaskHost {
            store, reset_timer, ..
        } = host;
        reset_timer.fire_if_due(store)
    })
}

fn mutate_by_id(
    op: &str,
    raw_id: &str,
    message: &str,
    f: impl FnOnce(&mut TaskStore<JsonFileStorage>, TaskId) -> bool,
) -> TaskActionResponse {
    let id = match raw_id.trim().parse::<TaskId>() {
        Ok(id) => id,
        Err(err) => return TaskActionResponse::failure(format!("{op} failed: invalid id: {err}")),
    };

    with_host(|host| {
        if f(&mut host.store, id) {
            TaskActionResponse::success(message, id, host.take_all_completed())
        } else {
            TaskActionResponse::no_op()
        }
    })
}

fn with_host<T>(f: impl FnOnce(&mut TaskHost) -> T) -> T {
    let host = TASK_HOST.get_or_init(|| Mutex::new(TaskHost::open(resolve_tasks_path(None))));
    let mut guard = lock_host(host);
    f(&mut guard)
}

fn lock_host(host: &Mutex<TaskHost>) -> MutexGuard<'_, TaskHost> {
    host.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn to_task_item(task: &Task) -> TaskItem {
    TaskItem {
        id: task.id.to_string(),
        title: task.title.clone(),
        kind: task.kind.label().to_string(),
        is_completed: task.is_completed,
        created_at: task.created_at.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}
