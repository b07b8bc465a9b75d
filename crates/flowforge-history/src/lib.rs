//! Flowforge History
//!
//! A linear undo/redo history over snapshots of editor state.
//!
//! The owner keeps [`History::set_current`] up to date with the live state and
//! calls [`History::take_snapshot`] immediately before every mutation it wants
//! to be undoable. [`History::undo`] and [`History::redo`] hand back the state
//! to restore; applying it (and then calling `set_current`) is the owner's job.
//!
//! There is no redo tree: a snapshot taken after an undo discards all redo
//! entries.

use std::collections::VecDeque;

use tracing::debug;

/// Default bound on the number of undo entries.
pub const DEFAULT_MAX_HISTORY: usize = 50;

#[derive(Debug, Clone)]
pub struct History<T: Clone> {
  past: VecDeque<T>,
  future: VecDeque<T>,
  current: T,
  max_history: usize,
}

impl<T: Clone + Default> Default for History<T> {
  fn default() -> Self {
    Self::new(T::default(), DEFAULT_MAX_HISTORY)
  }
}

impl<T: Clone> History<T> {
  /// Create a history around an initial state. `max_history` is at least 1.
  pub fn new(current: T, max_history: usize) -> Self {
    Self {
      past: VecDeque::new(),
      future: VecDeque::new(),
      current,
      max_history: max_history.max(1),
    }
  }

  /// Record the live state. Does not touch either stack.
  pub fn set_current(&mut self, state: T) {
    self.current = state;
  }

  pub fn current(&self) -> &T {
    &self.current
  }

  /// Push a copy of the live state onto the undo stack and drop all redo
  /// entries.
  pub fn take_snapshot(&mut self) {
    let snapshot = self.current.clone();
    self.push_past(snapshot);
    if !self.future.is_empty() {
      debug!(discarded = self.future.len(), "clearing redo history");
      self.future.clear();
    }
  }

  /// Pop the most recent snapshot, moving the live state to the redo stack.
  pub fn undo(&mut self) -> Option<T> {
    let previous = self.past.pop_back()?;
    self.future.push_front(self.current.clone());
    Some(previous)
  }

  /// Pop the next redo entry, moving the live state back to the undo stack.
  pub fn redo(&mut self) -> Option<T> {
    let next = self.future.pop_front()?;
    let current = self.current.clone();
    self.push_past(current);
    Some(next)
  }

  pub fn clear(&mut self) {
    self.past.clear();
    self.future.clear();
  }

  pub fn can_undo(&self) -> bool {
    !self.past.is_empty()
  }

  pub fn can_redo(&self) -> bool {
    !self.future.is_empty()
  }

  pub fn past_len(&self) -> usize {
    self.past.len()
  }

  pub fn future_len(&self) -> usize {
    self.future.len()
  }

  pub fn max_history(&self) -> usize {
    self.max_history
  }

  fn push_past(&mut self, state: T) {
    self.past.push_back(state);
    while self.past.len() > self.max_history {
      self.past.pop_front();
    }
  }
}
