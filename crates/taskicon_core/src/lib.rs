//! Core domain logic for Taskicon.
//! This crate is the single source of truth for task state and its daily reset.

pub mod config;
pub mod logging;
pub mod model;
pub mod schedule;
pub mod storage;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::task::{Task, TaskId, TaskKind, TaskValidationError};
pub use schedule::{
    next_midnight_after, Clock, DailyResetHandle, DailyResetScheduler, DailyResetTimer,
    ResetTimerState, SystemClock,
};
pub use storage::{JsonFileStorage, MemoryStorage, StorageError, StorageResult, TaskStorage};
pub use store::{
    lock_store, SharedTaskStore, StoreEvent, StoreSnapshot, SubscriptionId, TaskStore,
};

/// Minimal health-check API for host integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
