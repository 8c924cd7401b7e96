use super::{Clock, DailyResetTimer};
use crate::storage::TaskStorage;
use crate::store::{lock_store, SharedTaskStore};
use log::{debug, info};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Upper bound on a single sleep, so wall-clock jumps are noticed promptly.
pub const RESET_POLL_INTERVAL: Duration = Duration::from_secs(60);

/// Runs a `DailyResetTimer` against a shared store on the tokio runtime.
pub struct DailyResetScheduler;

/// Owner handle for a running reset loop.
pub struct DailyResetHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl DailyResetHandle {
    /// Stops the loop and waits for it to exit.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl DailyResetScheduler {
    /// Spawns the reset loop. Must be called from within a tokio runtime.
    pub fn spawn<C, S>(timer: DailyResetTimer<C>, store: SharedTaskStore<S>) -> DailyResetHandle
    where
        C: Clock + Send + 'static,
        S: TaskStorage + Send + 'static,
    {
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run_reset_loop(timer, store, shutdown_rx));
        DailyResetHandle { shutdown, task }
    }
}

async fn run_reset_loop<C, S>(
    mut timer: DailyResetTimer<C>,
    store: SharedTaskStore<S>,
    mut shutdown: watch::Receiver<bool>,
) where
    C: Clock,
    S: TaskStorage,
{
    info!("event=reset_loop module=schedule status=start");
    loop {
        let wait = timer.until_next_fire().min(RESET_POLL_INTERVAL);
        debug!(
            "event=reset_loop_wait module=schedule status=ok wait_ms={}",
            wait.as_millis()
        );

        tokio::select! {
            _ = tokio::time::sleep(wait) => {
                if timer.is_due() {
                    let mut guard = lock_store(&store);
                    timer.fire(&mut *guard);
                }
            }
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
        }
    }
    info!("event=reset_loop module=schedule status=stop");
}
