use std::time::Duration;

use crate::domain::PropagationEvent;

/// Propagation waits for eventually-consistent control-plane writes.
///
/// Tests inject an instant implementation; the duration always comes from
/// the named policy, never an inline constant.
pub trait Waiter {
    fn wait(&self, event: PropagationEvent, duration: Duration);
}
