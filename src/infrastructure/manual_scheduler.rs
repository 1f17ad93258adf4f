// Deterministic scheduler driven by explicit time advances
use crate::application::scheduler::{Scheduler, TaskHandle, TickCallback};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::time::Duration;

struct ManualTask {
    interval: Duration,
    elapsed: Duration,
    callback: Option<TickCallback>,
}

/// Records scheduled tasks and fires them only when time is advanced by hand.
#[derive(Default)]
pub struct ManualScheduler {
    next_handle: Mutex<u64>,
    tasks: Mutex<BTreeMap<TaskHandle, ManualTask>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_tasks(&self) -> usize {
        self.tasks.lock().len()
    }

    pub fn intervals(&self) -> Vec<Duration> {
        self.tasks.lock().values().map(|t| t.interval).collect()
    }

    /// Move time forward, firing each live task once per full interval
    /// elapsed. Returns the number of callbacks run.
    pub fn advance(&self, by: Duration) -> usize {
        let handles: Vec<TaskHandle> = self.tasks.lock().keys().copied().collect();
        let mut fired = 0;

        for handle in handles {
            let due = {
                let mut tasks = self.tasks.lock();
                let Some(task) = tasks.get_mut(&handle) else {
                    continue;
                };
                task.elapsed += by;
                let mut due = 0;
                while !task.interval.is_zero() && task.elapsed >= task.interval {
                    task.elapsed -= task.interval;
                    due += 1;
                }
                due
            };

            for _ in 0..due {
                // Run without holding the lock so the callback may reschedule.
                let Some(mut callback) = self
                    .tasks
                    .lock()
                    .get_mut(&handle)
                    .and_then(|t| t.callback.take())
                else {
                    break;
                };
                callback();
                fired += 1;
                if let Some(task) = self.tasks.lock().get_mut(&handle) {
                    task.callback = Some(callback);
                }
            }
        }

        fired
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&self, interval: Duration, callback: TickCallback) -> TaskHandle {
        let handle = {
            let mut next = self.next_handle.lock();
            *next += 1;
            TaskHandle(*next)
        };
        self.tasks.lock().insert(
            handle,
            ManualTask {
                interval,
                elapsed: Duration::ZERO,
                callback: Some(callback),
            },
        );
        handle
    }

    fn cancel(&self, handle: TaskHandle) {
        self.tasks.lock().remove(&handle);
    }
}
