//! CLI definitions and command implementations.

use anyhow::{bail, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use taskicon_core::config::{default_log_dir, resolve_tasks_path};
use taskicon_core::{
    default_log_level, init_logging, lock_store, DailyResetScheduler, DailyResetTimer,
    JsonFileStorage, StoreEvent, SystemClock, Task, TaskId, TaskKind, TaskStore,
};

#[derive(Parser)]
#[command(name = "taskicon", version, about = "Daily task tracker")]
pub struct Cli {
    /// Path to the task file (defaults to the platform data directory)
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// Directory for log files
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List tasks with their completion state
    List,

    /// Add a new task
    Add(AddArgs),

    /// Flip completion of a task
    Toggle(TaskRef),

    /// Rename a task
    Edit(EditArgs),

    /// Delete a task
    Delete(TaskRef),

    /// Print completion progress
    Progress,

    /// Clear completion on all daily tasks now
    Reset,

    /// Keep running and reset daily tasks at every local midnight
    Watch,
}

#[derive(Args)]
pub struct AddArgs {
    /// Task title
    title: String,

    /// Make the task repeat every day
    #[arg(short, long)]
    daily: bool,
}

#[derive(Args)]
pub struct TaskRef {
    /// Task ID, ID prefix, or exact title
    task: String,
}

#[derive(Args)]
pub struct EditArgs {
    /// Task ID, ID prefix, or exact title
    task: String,

    /// New title
    title: String,
}

pub async fn run(cli: Cli) -> Result<()> {
    setup_logging(cli.log_level.as_deref(), cli.log_dir.clone());

    let storage = JsonFileStorage::new(resolve_tasks_path(cli.file.as_deref()));
    let mut store = TaskStore::open(storage);

    match cli.command {
        Commands::List => {
            print_tasks(store.tasks());
            Ok(())
        }
        Commands::Add(args) => run_add(&mut store, args),
        Commands::Toggle(args) => {
            if let Some(id) = resolve_or_report(&store, &args.task)? {
                report_change(store.toggle(id), "Toggled", id);
            }
            Ok(())
        }
        Commands::Edit(args) => {
            let title = args.title.trim();
            if title.is_empty() {
                bail!("Title must not be empty");
            }
            if let Some(id) = resolve_or_report(&store, &args.task)? {
                report_change(store.edit(id, title), "Renamed", id);
            }
            Ok(())
        }
        Commands::Delete(args) => {
            if let Some(id) = resolve_or_report(&store, &args.task)? {
                report_change(store.delete(id), "Deleted", id);
            }
            Ok(())
        }
        Commands::Progress => {
            println!("{}", progress_line(&store));
            Ok(())
        }
        Commands::Reset => {
            let changed = store.apply_daily_reset();
            println!("Reset {changed} daily task(s). {}", progress_line(&store));
            Ok(())
        }
        Commands::Watch => run_watch(store).await,
    }
}

fn setup_logging(level: Option<&str>, log_dir: Option<PathBuf>) {
    let level = level.unwrap_or(default_log_level());
    let log_dir = log_dir.unwrap_or_else(default_log_dir);
    if let Err(err) = init_logging(level, &log_dir) {
        eprintln!("warning: logging disabled: {err}");
    }
}

fn run_add(store: &mut TaskStore<JsonFileStorage>, args: AddArgs) -> Result<()> {
    let title = args.title.trim();
    if title.is_empty() {
        bail!("Title must not be empty");
    }
    let kind = if args.daily {
        TaskKind::RepeatDaily
    } else {
        TaskKind::OneTime
    };

    let id = store.add(title, kind)?;
    println!("Added {} ({})", short_id(id), kind);
    Ok(())
}

/// Resolves `identifier`; an unmatched identifier is reported as a no-op.
fn resolve_or_report(
    store: &TaskStore<JsonFileStorage>,
    identifier: &str,
) -> Result<Option<TaskId>> {
    let resolved = resolve_task(identifier, store.tasks())?;
    if resolved.is_none() {
        println!("No matching task; nothing changed.");
    }
    Ok(resolved)
}

fn report_change(changed: bool, verb: &str, id: TaskId) {
    if changed {
        println!("{verb} {}", short_id(id));
    }
}

async fn run_watch(store: TaskStore<JsonFileStorage>) -> Result<()> {
    let store = Arc::new(Mutex::new(store));
    {
        let mut guard = lock_store(&store);
        guard.subscribe(|event| match event {
            StoreEvent::TasksChanged { progress } => {
                println!("Tasks changed: {:.0}% complete", progress * 100.0)
            }
            StoreEvent::AllCompleted => println!("All tasks complete!"),
        });
    }

    let timer = DailyResetTimer::new(SystemClock);
    if let Some(next_fire) = timer.next_fire() {
        println!("Next daily reset at {}", next_fire.with_timezone(&Local));
    }
    let handle = DailyResetScheduler::spawn(timer, Arc::clone(&store));

    println!("Watching for midnight. Press Ctrl-C to stop.");
    tokio::signal::ctrl_c().await?;
    handle.shutdown().await;
    Ok(())
}

/// Matches by exact ID, then unique ID prefix, then exact title.
fn resolve_task(identifier: &str, tasks: &[Task]) -> Result<Option<TaskId>> {
    let identifier = identifier.trim();
    if identifier.is_empty() {
        return Ok(None);
    }
    if let Some(task) = tasks.iter().find(|task| task.id.to_string() == identifier) {
        return Ok(Some(task.id));
    }

    let prefixed: Vec<&Task> = tasks
        .iter()
        .filter(|task| task.id.to_string().starts_with(identifier))
        .collect();
    match prefixed.as_slice() {
        [task] => return Ok(Some(task.id)),
        [] => {}
        _ => bail!("Ambiguous task ID prefix: {identifier}"),
    }

    let titled: Vec<&Task> = tasks.iter().filter(|task| task.title == identifier).collect();
    match titled.as_slice() {
        [task] => Ok(Some(task.id)),
        [] => Ok(None),
        _ => bail!("Several tasks are titled `{identifier}`; use the ID instead"),
    }
}

fn print_tasks(tasks: &[Task]) {
    if tasks.is_empty() {
        println!("No tasks");
        return;
    }
    for task in tasks {
        let mark = if task.is_completed { "x" } else { " " };
        let repeat = if task.is_recurring() { " (daily)" } else { "" };
        println!("[{mark}] {}  {}{repeat}", short_id(task.id), task.title);
    }
}

fn progress_line(store: &TaskStore<JsonFileStorage>) -> String {
    format!(
        "{}/{} complete ({:.0}%)",
        store.completed_count(),
        store.len(),
        store.progress() * 100.0
    )
}

fn short_id(id: TaskId) -> String {
    id.simple().to_string()[..8].to_string()
}

#[cfg(test)]
mod tests {
    use super::{resolve_task, short_id};
    use taskicon_core::{Task, TaskKind};

    #[test]
    fn resolve_task_by_id_prefix_and_title() {
        let tasks = vec![
            Task::new("Buy milk", TaskKind::OneTime),
            Task::new("Stretch", TaskKind::RepeatDaily),
        ];

        let by_id = resolve_task(&tasks[0].id.to_string(), &tasks).unwrap();
        assert_eq!(by_id, Some(tasks[0].id));

        let by_prefix = resolve_task(&tasks[1].id.to_string()[..13], &tasks).unwrap();
        assert_eq!(by_prefix, Some(tasks[1].id));

        let by_title = resolve_task("Stretch", &tasks).unwrap();
        assert_eq!(by_title, Some(tasks[1].id));
    }

    #[test]
    fn resolve_task_unknown_is_none() {
        let tasks = vec![Task::new("Buy milk", TaskKind::OneTime)];
        assert_eq!(resolve_task("Stretch", &tasks).unwrap(), None);
    }

    #[test]
    fn resolve_task_blank_identifier_is_none() {
        let single = vec![Task::new("Buy milk", TaskKind::OneTime)];
        assert_eq!(resolve_task("   ", &single).unwrap(), None);
        assert_eq!(resolve_task("", &single).unwrap(), None);

        let several = vec![
            Task::new("Buy milk", TaskKind::OneTime),
            Task::new("Stretch", TaskKind::RepeatDaily),
        ];
        assert_eq!(resolve_task(" \t ", &several).unwrap(), None);
    }

    #[test]
    fn resolve_task_rejects_duplicate_titles() {
        let tasks = vec![
            Task::new("Buy milk", TaskKind::OneTime),
            Task::new("Buy milk", TaskKind::OneTime),
        ];
        assert!(resolve_task("Buy milk", &tasks).is_err());
    }

    #[test]
    fn short_id_is_eight_hex_chars() {
        let task = Task::new("x", TaskKind::OneTime);
        let short = short_id(task.id);
        assert_eq!(short.len(), 8);
        assert!(task.id.to_string().starts_with(&short));
    }
}
