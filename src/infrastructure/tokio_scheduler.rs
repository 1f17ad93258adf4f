// Scheduler backed by tokio interval tasks
use crate::application::scheduler::{Scheduler, TaskHandle, TickCallback};
use anyhow::Context;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

pub struct TokioScheduler {
    runtime: Handle,
    next_handle: AtomicU64,
    tasks: Mutex<HashMap<TaskHandle, JoinHandle<()>>>,
}

impl TokioScheduler {
    pub fn new(runtime: Handle) -> Self {
        Self {
            runtime,
            next_handle: AtomicU64::new(1),
            tasks: Mutex::new(HashMap::new()),
        }
    }

    /// Scheduler spawning onto the runtime this is called from.
    pub fn current() -> anyhow::Result<Self> {
        let runtime = Handle::try_current().context("no tokio runtime is running")?;
        Ok(Self::new(runtime))
    }

    pub fn live_tasks(&self) -> usize {
        self.tasks.lock().len()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, interval: Duration, mut callback: TickCallback) -> TaskHandle {
        let handle = TaskHandle(self.next_handle.fetch_add(1, Ordering::Relaxed));
        let task: JoinHandle<()> = self.runtime.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                callback();
            }
        });
        self.tasks.lock().insert(handle, task);
        tracing::debug!(%handle, ?interval, "timer scheduled");
        handle
    }

    fn cancel(&self, handle: TaskHandle) {
        if let Some(task) = self.tasks.lock().remove(&handle) {
            task.abort();
            tracing::debug!(%handle, "timer cancelled");
        }
    }
}

impl Drop for TokioScheduler {
    fn drop(&mut self) {
        for (_, task) in self.tasks.lock().drain() {
            task.abort();
        }
    }
}
