use crate::strokes::model::Stroke;
use std::cell::RefCell;
use std::rc::Rc;

/// Playback notifications. Every method defaults to a no-op.
///
/// Ordering contract: `drew` is called in strictly increasing index order within one render
/// run, and `erased` in strictly decreasing order within one erase.
pub trait PlaybackObserver {
    /// Stroke data was delivered and prepared.
    fn loaded(&mut self, _strokes: &[Stroke]) {}
    /// Stroke `index` was erased.
    fn erased(&mut self, _index: usize) {}
    /// Stroke `index` was drawn.
    fn drew(&mut self, _index: usize) {}
}

impl PlaybackObserver for () {}

/// Observer that reports notifications through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl PlaybackObserver for TracingObserver {
    fn loaded(&mut self, strokes: &[Stroke]) {
        tracing::info!(strokes = strokes.len(), "strokes loaded");
    }

    fn erased(&mut self, index: usize) {
        tracing::debug!(index, "stroke erased");
    }

    fn drew(&mut self, index: usize) {
        tracing::debug!(index, "stroke drawn");
    }
}

/// One recorded notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// `loaded` with the number of strokes.
    Loaded(usize),
    /// `erased(index)`.
    Erased(usize),
    /// `drew(index)`.
    Drew(usize),
}

/// Shared in-memory notification log for tests and debugging.
///
/// Clones share the same log, so one clone can be handed to the engine while another is read.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Rc<RefCell<Vec<PlaybackEvent>>>,
}

impl EventLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything recorded so far.
    pub fn events(&self) -> Vec<PlaybackEvent> {
        self.events.borrow().clone()
    }

    /// Take everything recorded so far, leaving the log empty.
    pub fn drain(&self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    /// Indices passed to `drew`, in call order.
    pub fn drawn(&self) -> Vec<usize> {
        self.filter(|e| match e {
            PlaybackEvent::Drew(i) => Some(i),
            _ => None,
        })
    }

    /// Indices passed to `erased`, in call order.
    pub fn erased(&self) -> Vec<usize> {
        self.filter(|e| match e {
            PlaybackEvent::Erased(i) => Some(i),
            _ => None,
        })
    }

    fn filter(&self, f: impl Fn(PlaybackEvent) -> Option<usize>) -> Vec<usize> {
        self.events.borrow().iter().copied().filter_map(f).collect()
    }

    fn push(&self, e: PlaybackEvent) {
        self.events.borrow_mut().push(e);
    }
}

impl PlaybackObserver for EventLog {
    fn loaded(&mut self, strokes: &[Stroke]) {
        self.push(PlaybackEvent::Loaded(strokes.len()));
    }

    fn erased(&mut self, index: usize) {
        self.push(PlaybackEvent::Erased(index));
    }

    fn drew(&mut self, index: usize) {
        self.push(PlaybackEvent::Drew(index));
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/events.rs"]
mod tests;
