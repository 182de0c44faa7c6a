//! Tokio-backed scheduler.
//!
//! Each `schedule` spawns a task that sleeps for the requested delay and then
//! sends its `TimerId` down a channel. The driver loop receives ids from that
//! channel and hands them to the controller; cancel aborts the task. An id
//! can still slip through if the task had already sent it when cancelled,
//! which the controller ignores as stale.

use std::{collections::HashMap, time::Duration};

use bb84_core::{Scheduler, TimerId};
use tokio::{sync::mpsc, task::JoinHandle};

/// Receiving half of a [`TokioScheduler`].
pub type TimerReceiver = mpsc::UnboundedReceiver<TimerId>;

/// Scheduler spawning one sleep task per timer.
///
/// Must be used from within a tokio runtime.
#[derive(Debug)]
pub struct TokioScheduler {
    tx: mpsc::UnboundedSender<TimerId>,
    next_id: u64,
    tasks: HashMap<TimerId, JoinHandle<()>>,
}

impl TokioScheduler {
    /// Scheduler plus the receiver its expiries arrive on.
    pub fn new() -> (Self, TimerReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx, next_id: 0, tasks: HashMap::new() }, rx)
    }

    /// Number of sleep tasks that have not finished or been aborted.
    pub fn pending_count(&self) -> usize {
        self.tasks.values().filter(|task| !task.is_finished()).count()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, after: Duration) -> TimerId {
        self.tasks.retain(|_, task| !task.is_finished());

        let id = TimerId::new(self.next_id);
        self.next_id += 1;

        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            // Receiver gone means the driver is shutting down
            let _ = tx.send(id);
        });
        self.tasks.insert(id, task);
        tracing::trace!(%id, ?after, "timer scheduled");
        id
    }

    fn cancel(&mut self, timer: TimerId) {
        if let Some(task) = self.tasks.remove(&timer) {
            task.abort();
            tracing::trace!(%timer, "timer cancelled");
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for task in self.tasks.values() {
            task.abort();
        }
    }
}
