//! Storage and log location resolution.
//!
//! # Responsibility
//! - Decide where the task file and log files live for this process.
//!
//! # Invariants
//! - Resolution never fails; it falls back to the temp directory.
//! - An explicit override always wins over the environment.

use std::env;
use std::path::{Path, PathBuf};

/// Environment variable overriding the task file location.
pub const TASKS_PATH_ENV: &str = "TASKICON_TASKS_PATH";
/// Environment variable overriding the log directory.
pub const LOG_DIR_ENV: &str = "TASKICON_LOG_DIR";
/// Folder created under the platform data directory.
pub const APP_DIR_NAME: &str = "TaskiferTasks";
pub const TASKS_FILE_NAME: &str = "tasks.json";
const LOG_DIR_NAME: &str = "logs";

/// Resolves the task file path.
///
/// Order: `override_path`, `TASKICON_TASKS_PATH`, the platform data directory
/// (`~/Library/Application Support` on macOS), then the temp directory.
pub fn resolve_tasks_path(override_path: Option<&Path>) -> PathBuf {
    if let Some(path) = override_path {
        return path.to_path_buf();
    }
    if let Some(path) = env_path(TASKS_PATH_ENV) {
        return path;
    }
    match app_data_dir() {
        Some(dir) => dir.join(TASKS_FILE_NAME),
        None => env::temp_dir().join(TASKS_FILE_NAME),
    }
}

/// Resolves the default log directory. Always absolute.
pub fn default_log_dir() -> PathBuf {
    if let Some(path) = env_path(LOG_DIR_ENV) {
        if path.is_absolute() {
            return path;
        }
    }
    match app_data_dir() {
        Some(dir) => dir.join(LOG_DIR_NAME),
        None => env::temp_dir().join(APP_DIR_NAME).join(LOG_DIR_NAME),
    }
}

fn app_data_dir() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join(APP_DIR_NAME))
}

fn env_path(key: &str) -> Option<PathBuf> {
    let raw = env::var(key).ok()?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(PathBuf::from(trimmed))
}

#[cfg(test)]
mod tests {
    use super::{default_log_dir, resolve_tasks_path};
    use std::path::Path;

    #[test]
    fn explicit_override_wins() {
        let path = resolve_tasks_path(Some(Path::new("/tmp/custom/tasks.json")));
        assert_eq!(path, Path::new("/tmp/custom/tasks.json"));
    }

    #[test]
    fn default_log_dir_is_absolute() {
        assert!(default_log_dir().is_absolute());
    }
}
