//! Look-ahead scheduler.
//!
//! Woken on a coarse, jittery timer (every [`DEFAULT_LOOKAHEAD`]), it hands
//! every step due within the next `horizon` seconds of audio-clock time to
//! the voice renderers, stamped with its exact absolute start time. The
//! audio engine then starts each voice on the matching frame, so wake-up
//! jitter never reaches the audio.

use std::time::Duration;

use tracing::debug;

use crate::sequencer::params::LiveParams;
use crate::sequencer::pattern::PatternMatrix;
use crate::sequencer::queue::{NoteQueue, ScheduledNote};
use crate::sequencer::render::VoiceRenderer;
use crate::shared::StepIndex;

/// Nominal wake-up interval.
pub const DEFAULT_LOOKAHEAD: Duration = Duration::from_millis(25);
/// How far ahead of the audio clock notes are scheduled, in seconds.
pub const DEFAULT_HORIZON: f64 = 0.1;

#[derive(Clone, Debug)]
pub struct LookaheadScheduler {
    horizon: f64,
    current_step: StepIndex,
    next_note_time: f64,
}

impl LookaheadScheduler {
    pub fn new(horizon: f64) -> Self {
        Self {
            horizon,
            current_step: StepIndex::FIRST,
            next_note_time: 0.0,
        }
    }

    /// Restart the loop from step 0, due immediately at `now`.
    pub fn reset(&mut self, now: f64) {
        self.current_step = StepIndex::FIRST;
        self.next_note_time = now;
    }

    #[cfg(test)]
    pub fn current_step(&self) -> StepIndex {
        self.current_step
    }

    #[cfg(test)]
    pub fn next_note_time(&self) -> f64 {
        self.next_note_time
    }

    /// Emit every step whose start time falls before `now + horizon`.
    ///
    /// This is a catch-up loop: a late wake-up emits all of the steps it
    /// missed, in order, so playback never drifts behind the audio clock and
    /// no step is skipped. Returns the number of steps emitted.
    pub fn wake(
        &mut self,
        now: f64,
        pattern: &PatternMatrix,
        params: &LiveParams,
        queue: &mut NoteQueue,
        renderer: &mut dyn VoiceRenderer,
    ) -> usize {
        let mut emitted = 0;
        while self.next_note_time < now + self.horizon {
            self.schedule_note(pattern, params, queue, renderer);
            self.advance(params.beat_duration());
            emitted += 1;
        }
        if emitted > 1 {
            debug!(emitted, now, "catch-up wake-up");
        }
        emitted
    }

    fn schedule_note(
        &self,
        pattern: &PatternMatrix,
        params: &LiveParams,
        queue: &mut NoteQueue,
        renderer: &mut dyn VoiceRenderer,
    ) {
        let (step, time) = (self.current_step, self.next_note_time);
        // queued even when no pad is on, so the highlight still moves
        queue.push(ScheduledNote { step, time });
        for voice in pattern.enabled_voices(step) {
            renderer.trigger(voice, time, params);
        }
    }

    // Tempo is read here and only here, so a change never moves steps that
    // were already scheduled.
    fn advance(&mut self, beat_duration: f64) {
        self.next_note_time += beat_duration;
        self.current_step = self.current_step.next();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::params::ParamKind;
    use crate::sequencer::render::RecordingRenderer;
    use crate::shared::VoiceId;

    struct Rig {
        scheduler: LookaheadScheduler,
        pattern: PatternMatrix,
        params: LiveParams,
        queue: NoteQueue,
        renderer: RecordingRenderer,
    }

    impl Rig {
        fn new(bpm: f64) -> Self {
            let mut params = LiveParams::default();
            params.set(ParamKind::Tempo, bpm).unwrap();
            Self {
                scheduler: LookaheadScheduler::new(DEFAULT_HORIZON),
                pattern: PatternMatrix::new(),
                params,
                queue: NoteQueue::new(),
                renderer: RecordingRenderer::default(),
            }
        }

        fn wake(&mut self, now: f64) -> usize {
            self.scheduler.wake(
                now,
                &self.pattern,
                &self.params,
                &mut self.queue,
                &mut self.renderer,
            )
        }

        fn steps(&self) -> Vec<usize> {
            self.queue.iter().map(|n| n.step.index()).collect()
        }

        fn times(&self) -> Vec<f64> {
            self.queue.iter().map(|n| n.time).collect()
        }
    }

    fn step(i: usize) -> StepIndex {
        StepIndex::new(i).unwrap()
    }

    #[test]
    fn stalled_wake_catches_up_in_one_call() {
        let mut rig = Rig::new(120.0);
        rig.scheduler.reset(0.0);

        let emitted = rig.wake(1.2);

        assert_eq!(emitted, 3);
        assert_eq!(rig.steps(), vec![0, 1, 2]);
        assert_eq!(rig.times(), vec![0.0, 0.5, 1.0]);
        assert_eq!(rig.scheduler.current_step(), step(3));
        assert_eq!(rig.scheduler.next_note_time(), 1.5);
    }

    #[test]
    fn nothing_due_emits_nothing() {
        let mut rig = Rig::new(120.0);
        rig.scheduler.reset(0.0);
        assert_eq!(rig.wake(0.0), 1);
        // next step at 0.5, horizon reaches 0.35
        assert_eq!(rig.wake(0.25), 0);
        assert_eq!(rig.wake(0.399), 0);
        assert_eq!(rig.wake(0.401), 1);
    }

    #[test]
    fn jittery_wakeups_never_skip_or_repeat_steps() {
        let mut rig = Rig::new(180.0);
        rig.scheduler.reset(10.0);

        // irregular gaps, including stalls much longer than the horizon
        let gaps = [0.025, 0.031, 0.4, 0.002, 0.025, 1.7, 0.026, 0.024, 0.9, 0.05];
        let mut now = 10.0;
        for _ in 0..5 {
            for gap in gaps {
                now += gap;
                rig.wake(now);
                assert!(rig.scheduler.next_note_time() >= now + DEFAULT_HORIZON);
            }
        }

        let steps = rig.steps();
        assert!(steps.len() > 40);
        for (i, s) in steps.iter().enumerate() {
            assert_eq!(*s, i % 4, "step sequence broke at note {i}");
        }
    }

    #[test]
    fn spacing_is_one_beat_regardless_of_jitter() {
        for bpm in [60.0, 97.0, 120.0, 133.3, 180.0] {
            let mut rig = Rig::new(bpm);
            rig.scheduler.reset(3.0);
            let mut now = 3.0;
            for i in 0..200 {
                now += 0.025 + (i % 7) as f64 * 0.013;
                rig.wake(now);
            }
            let beat = 60.0 / bpm;
            let times = rig.times();
            for pair in times.windows(2) {
                assert!(((pair[1] - pair[0]) - beat).abs() < 1e-9, "bpm {bpm}");
            }
        }
    }

    #[test]
    fn tempo_change_only_moves_future_steps() {
        let mut rig = Rig::new(120.0);
        rig.scheduler.reset(0.0);
        rig.wake(0.45); // steps at 0.0 and 0.5; next due at 1.0

        rig.params.set(ParamKind::Tempo, 60.0).unwrap();
        rig.wake(1.0);

        // 1.0 was computed before the change, the step after uses the new beat
        assert_eq!(rig.times(), vec![0.0, 0.5, 1.0]);
        assert_eq!(rig.scheduler.next_note_time(), 2.0);
    }

    #[test]
    fn only_enabled_voices_are_rendered() {
        let mut rig = Rig::new(120.0);
        rig.pattern.set(VoiceId::Noise, step(1), true);
        rig.scheduler.reset(0.0);

        let mut now = 0.0;
        while now < 4.0 {
            rig.wake(now);
            now += 0.025;
        }

        // two full loops of 2 s each
        let step1_times: Vec<f64> = rig
            .queue
            .iter()
            .filter(|n| n.step == step(1))
            .map(|n| n.time)
            .collect();
        let noise: Vec<f64> = rig.renderer.for_voice(VoiceId::Noise).iter().map(|t| t.time).collect();
        assert_eq!(noise, step1_times);
        assert_eq!(noise, vec![0.5, 2.5]);
        assert_eq!(rig.renderer.calls.len(), noise.len());
    }

    #[test]
    fn voices_on_one_step_share_a_timestamp() {
        let mut rig = Rig::new(120.0);
        for v in VoiceId::ALL {
            rig.pattern.set(v, step(0), true);
        }
        rig.scheduler.reset(5.0);
        rig.wake(5.0);

        assert_eq!(rig.renderer.calls.len(), 4);
        assert!(rig.renderer.calls.iter().all(|t| t.time == 5.0));
    }

    #[test]
    fn attack_change_reaches_only_later_steps() {
        let mut rig = Rig::new(120.0);
        for s in 0..4 {
            rig.pattern.set(VoiceId::Sweep, step(s), true);
        }
        rig.scheduler.reset(0.0);
        rig.wake(0.45); // steps 0 and 1 rendered

        rig.params.set(ParamKind::Attack, 0.9).unwrap();
        rig.wake(1.45); // steps 2 and 3

        let attacks: Vec<f64> = rig.renderer.calls.iter().map(|t| t.params.attack()).collect();
        assert_eq!(attacks, vec![0.2, 0.2, 0.9, 0.9]);
    }

    #[test]
    fn reset_restarts_from_step_zero_at_now() {
        let mut rig = Rig::new(120.0);
        rig.scheduler.reset(0.0);
        rig.wake(0.7);
        assert_ne!(rig.scheduler.current_step(), StepIndex::FIRST);

        rig.scheduler.reset(42.0);
        assert_eq!(rig.scheduler.current_step(), StepIndex::FIRST);
        assert_eq!(rig.scheduler.next_note_time(), 42.0);
    }
}
