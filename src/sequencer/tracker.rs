//! Playback position tracker.
//!
//! Runs on the display cadence, not the scheduler's. The scheduler queues
//! notes up to a horizon into the future; the tracker only consumes them
//! once the audio clock has reached their start time, which gives the UI
//! the step that is audible right now.

use crate::sequencer::queue::NoteQueue;
use crate::shared::StepIndex;

#[derive(Clone, Debug)]
pub struct PositionTracker {
    last_drawn: StepIndex,
}

impl Default for PositionTracker {
    fn default() -> Self {
        // the loop starts on step 0, which must register as a change
        Self { last_drawn: StepIndex::LAST }
    }
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    pub fn last_drawn(&self) -> StepIndex {
        self.last_drawn
    }

    /// Drain every note whose time has been reached and return the new
    /// audible step if it differs from the one last reported.
    pub fn refresh(&mut self, now: f64, queue: &mut NoteQueue) -> Option<StepIndex> {
        let mut candidate = self.last_drawn;
        while let Some(note) = queue.peek() {
            if note.time > now {
                break;
            }
            candidate = note.step;
            queue.pop();
        }

        if candidate == self.last_drawn {
            return None;
        }
        self.last_drawn = candidate;
        Some(candidate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::queue::ScheduledNote;

    fn queue_of(notes: &[(usize, f64)]) -> NoteQueue {
        let mut q = NoteQueue::new();
        for (step, time) in notes {
            q.push(ScheduledNote { step: StepIndex::new(*step).unwrap(), time: *time });
        }
        q
    }

    #[test]
    fn never_draws_a_note_before_its_time() {
        let mut q = queue_of(&[(0, 1.0), (1, 1.5)]);
        let mut t = PositionTracker::new();

        assert_eq!(t.refresh(0.999, &mut q), None);
        assert_eq!(q.len(), 2);
        assert_eq!(t.refresh(1.0, &mut q), StepIndex::new(0));
        assert_eq!(q.len(), 1);
        assert_eq!(t.refresh(1.2, &mut q), None);
        assert_eq!(t.refresh(1.5, &mut q), StepIndex::new(1));
        assert!(q.is_empty());
    }

    #[test]
    fn late_frame_jumps_to_newest_elapsed_step() {
        let mut q = queue_of(&[(0, 0.0), (1, 0.5), (2, 1.0), (3, 1.5)]);
        let mut t = PositionTracker::new();

        assert_eq!(t.refresh(1.1, &mut q), StepIndex::new(2));
        assert_eq!(q.len(), 1);
        assert_eq!(t.last_drawn(), StepIndex::new(2).unwrap());
    }

    #[test]
    fn repeated_step_is_reported_once() {
        // the newest elapsed step equals the initial last-drawn step
        let mut q = queue_of(&[(0, 0.0), (1, 0.5), (2, 1.0), (3, 1.5)]);
        let mut t = PositionTracker::new();
        assert_eq!(t.refresh(1.6, &mut q), None); // was 3, still 3
        assert_eq!(t.refresh(2.0, &mut q), None);
    }

    #[test]
    fn idle_queue_is_a_no_op() {
        let mut q = NoteQueue::new();
        let mut t = PositionTracker::new();
        for now in [0.0, 10.0, 1e6] {
            assert_eq!(t.refresh(now, &mut q), None);
        }
        assert_eq!(t.last_drawn(), StepIndex::LAST);
    }
}
