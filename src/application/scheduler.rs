// Periodic timer seam
use std::fmt;
use std::time::Duration;

/// Identifies one scheduled periodic task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(pub u64);

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task-{}", self.0)
    }
}

pub type TickCallback = Box<dyn FnMut() + Send + 'static>;

pub trait Scheduler: Send + Sync {
    /// Run `callback` every `interval`, first firing one interval from now.
    fn schedule(&self, interval: Duration, callback: TickCallback) -> TaskHandle;

    /// Stop a task. Unknown or already cancelled handles are ignored.
    fn cancel(&self, handle: TaskHandle);
}
