use std::thread;
use std::time::Duration;

use crate::domain::PropagationEvent;
use crate::ports::Waiter;

/// Blocking propagation waits on the current thread.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadWaiter;

impl ThreadWaiter {
    pub fn new() -> Self {
        Self
    }
}

impl Waiter for ThreadWaiter {
    fn wait(&self, event: PropagationEvent, duration: Duration) {
        if duration.is_zero() {
            return;
        }
        println!("⏳ Waiting {}s for {}...", duration.as_secs(), event.describe());
        thread::sleep(duration);
    }
}
