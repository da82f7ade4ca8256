//! FIFO of notes handed from the scheduler to the position tracker.

use std::collections::VecDeque;

use crate::shared::StepIndex;

/// A step that has been handed to the voice renderers, stamped with the
/// absolute audio-clock time (seconds) it will sound at.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScheduledNote {
    pub step: StepIndex,
    pub time: f64,
}

/// Notes in non-decreasing time order.
///
/// The scheduler appends in time order, so ordering holds by construction
/// and the queue never has to search for an insertion point.
#[derive(Clone, Debug, Default)]
pub struct NoteQueue {
    notes: VecDeque<ScheduledNote>,
}

impl NoteQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a note. Must not be earlier than the newest queued note.
    pub fn push(&mut self, note: ScheduledNote) {
        debug_assert!(
            self.notes.back().is_none_or(|last| last.time <= note.time),
            "notes must be pushed in time order"
        );
        self.notes.push_back(note);
    }

    /// Earliest note without removing it.
    pub fn peek(&self) -> Option<&ScheduledNote> {
        self.notes.front()
    }

    /// Remove and return the earliest note.
    pub fn pop(&mut self) -> Option<ScheduledNote> {
        self.notes.pop_front()
    }

    pub fn clear(&mut self) {
        self.notes.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    #[cfg(test)]
    pub fn iter(&self) -> impl Iterator<Item = &ScheduledNote> {
        self.notes.iter()
    }
}
