//! Domain model for the task tracker.
//!
//! # Responsibility
//! - Define the task record shared by the store, storage adapters and UI.
//!
//! # Invariants
//! - Every task is identified by a stable, non-nil `TaskId`.
//! - A task's kind is fixed at creation.

pub mod task;
