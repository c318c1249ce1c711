use crate::foundation::core::Millis;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Handle to one scheduled task; doubles as its cancellation token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

/// Deterministic virtual-clock timer queue.
///
/// Determinism rule: tasks fire in `(due, scheduling order)` order. Cancelled entries stay in the
/// heap until they reach its head; the head is always a live task.
pub(crate) struct Timeline<T> {
    now: Millis,
    next_id: u64,
    queue: BinaryHeap<Reverse<(Millis, TimerId)>>,
    tasks: HashMap<TimerId, T>,
}

impl<T> Timeline<T> {
    pub(crate) fn new() -> Self {
        Self {
            now: Millis::ZERO,
            next_id: 0,
            queue: BinaryHeap::new(),
            tasks: HashMap::new(),
        }
    }

    pub(crate) fn now(&self) -> Millis {
        self.now
    }

    /// Move the clock forward; the clock never runs backwards and stays finite.
    pub(crate) fn set_now(&mut self, t: Millis) {
        if t.as_f64().is_finite() {
            self.now = self.now.max(t);
        }
    }

    /// Schedule `task` to fire `delay` after the current clock.
    pub(crate) fn schedule(&mut self, delay: Millis, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let due = self.now + delay.max(Millis::ZERO);
        self.queue.push(Reverse((due, id)));
        self.tasks.insert(id, task);
        id
    }

    /// Cancel a pending task, handing it back. Unknown or fired ids yield `None`.
    pub(crate) fn cancel(&mut self, id: TimerId) -> Option<T> {
        let task = self.tasks.remove(&id);
        self.prune_head();
        task
    }

    /// Due time of the earliest pending task.
    pub(crate) fn next_due(&self) -> Option<Millis> {
        self.queue.peek().map(|Reverse((due, _))| *due)
    }

    /// Pop the earliest pending task due at or before `until`, moving the clock to its due time.
    pub(crate) fn pop_due(&mut self, until: Millis) -> Option<(TimerId, T)> {
        let Reverse((due, id)) = *self.queue.peek()?;
        if due > until {
            return None;
        }
        self.queue.pop();
        self.set_now(due);
        let task = self.tasks.remove(&id);
        self.prune_head();
        task.map(|task| (id, task))
    }

    fn prune_head(&mut self) {
        while let Some(Reverse((_, id))) = self.queue.peek() {
            if self.tasks.contains_key(id) {
                break;
            }
            self.queue.pop();
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/timeline.rs"]
mod tests;
