use std::cell::RefCell;
use std::time::Duration;

use crate::domain::PropagationEvent;
use crate::ports::Waiter;

/// Waiter double that records events without sleeping.
#[derive(Default)]
pub struct InstantWaiter {
    events: RefCell<Vec<(PropagationEvent, Duration)>>,
}

impl InstantWaiter {
    pub fn events(&self) -> Vec<(PropagationEvent, Duration)> {
        self.events.borrow().clone()
    }
}

impl Waiter for InstantWaiter {
    fn wait(&self, event: PropagationEvent, duration: Duration) {
        self.events.borrow_mut().push((event, duration));
    }
}
