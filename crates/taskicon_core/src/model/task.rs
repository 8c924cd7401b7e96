//! Task domain model.
//!
//! # Responsibility
//! - Define the persisted task record and its wire naming.
//! - Provide the per-task transitions used by the store (toggle, daily reset).
//!
//! # Invariants
//! - `id` is generated once and never reused or changed.
//! - `kind` and `created_at` never change after construction.
//! - Only `RepeatDaily` tasks are touched by the daily reset.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for a task; the sole lookup and equality key.
pub type TaskId = Uuid;

/// Recurrence behavior of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    /// Completion stays until the user toggles it back.
    OneTime,
    /// Completion is cleared at every local midnight.
    RepeatDaily,
}

impl TaskKind {
    /// Wire label, identical to the serialized form.
    pub fn label(self) -> &'static str {
        match self {
            Self::OneTime => "one_time",
            Self::RepeatDaily => "repeat_daily",
        }
    }

    /// Parses a wire label. Accepts `daily` as a shorthand for `repeat_daily`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "one_time" | "once" => Some(Self::OneTime),
            "repeat_daily" | "daily" => Some(Self::RepeatDaily),
            _ => None,
        }
    }
}

impl Display for TaskKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Validation failures for task records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    NilId,
    EmptyTitle,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NilId => write!(f, "task id must not be nil"),
            Self::EmptyTitle => write!(f, "task title must not be empty"),
        }
    }
}

impl Error for TaskValidationError {}

/// A user-entered to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TaskRecord")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    /// Serialized as `type` to match the persisted file layout.
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub is_completed: bool,
    /// Informational only; not used for ordering or reset decisions.
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Creates an incomplete task with a fresh id stamped with the current time.
    pub fn new(title: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            kind,
            is_completed: false,
            created_at: Utc::now(),
        }
    }

    /// Creates a task with caller-provided identity and timestamp.
    ///
    /// Used by import and test paths.
    ///
    /// # Errors
    /// - `NilId` when `id` is the nil UUID.
    pub fn with_id(
        id: TaskId,
        title: impl Into<String>,
        kind: TaskKind,
        created_at: DateTime<Utc>,
    ) -> Result<Self, TaskValidationError> {
        if id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        Ok(Self {
            id,
            title: title.into(),
            kind,
            is_completed: false,
            created_at,
        })
    }

    /// Checks the invariants required before a task enters the store.
    ///
    /// # Errors
    /// - `NilId` when the id is nil.
    /// - `EmptyTitle` when the title is empty or whitespace-only.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.is_nil() {
            return Err(TaskValidationError::NilId);
        }
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        Ok(())
    }

    pub fn is_recurring(&self) -> bool {
        self.kind == TaskKind::RepeatDaily
    }

    /// Flips completion state.
    pub fn toggle(&mut self) {
        self.is_completed = !self.is_completed;
    }

    /// Applies the midnight rollover to this task.
    ///
    /// Returns `true` when the completion flag actually changed.
    pub fn reset_for_new_day(&mut self) -> bool {
        if !self.is_recurring() || !self.is_completed {
            return false;
        }
        self.is_completed = false;
        true
    }
}

/// Raw decoded shape, checked before it becomes a `Task`.
#[derive(Deserialize)]
struct TaskRecord {
    id: TaskId,
    title: String,
    #[serde(rename = "type")]
    kind: TaskKind,
    is_completed: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<TaskRecord> for Task {
    type Error = TaskValidationError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        // Titles emptied through `edit` are legal on disk; only identity is checked.
        let mut task = Task::with_id(record.id, record.title, record.kind, record.created_at)?;
        task.is_completed = record.is_completed;
        Ok(task)
    }
}
