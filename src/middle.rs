// The middle layer: owns pattern, parameters and the sequencer state, turns
// input events into state changes, and hands the TUI a DisplayState.
//
// Everything here runs on the main thread. Scheduler wake-ups, display
// refreshes and input handling are separate calls from the main loop and
// never overlap, so nothing in here needs a lock.

use tracing::{debug, warn};

use crate::audio::AudioClock;
use crate::pipeline::settings::Settings;
use crate::sequencer::{
    AssetState, LiveParams, LookaheadScheduler, NoteQueue, ParamKind, PatternMatrix,
    PositionTracker, Transport, VoiceRenderer,
};
use crate::shared::{DisplayState, InputEvent, StepIndex};

pub struct Middle {
    pattern: PatternMatrix,
    params: LiveParams,
    transport: Transport,
    scheduler: LookaheadScheduler,
    tracker: PositionTracker,
    queue: NoteQueue,
    selected_param: ParamKind,
    playing_step: Option<StepIndex>,
    display_text: String,
}

impl Middle {
    pub fn new(settings: &Settings) -> Self {
        Self {
            pattern: PatternMatrix::new(),
            params: settings.params.clone(),
            transport: Transport::new(),
            scheduler: LookaheadScheduler::new(settings.timing.horizon_secs),
            tracker: PositionTracker::new(),
            queue: NoteQueue::new(),
            selected_param: ParamKind::Tempo,
            playing_step: None,
            display_text: String::from("loading sample..."),
        }
    }

    #[cfg(test)]
    pub fn params(&self) -> &LiveParams {
        &self.params
    }

    pub fn is_playing(&self) -> bool {
        self.transport.is_playing()
    }

    pub fn asset_ready(&mut self) {
        self.transport.asset_ready();
        self.display_text.clear();
    }

    pub fn asset_failed(&mut self, err: &anyhow::Error) {
        self.transport.asset_failed(format!("{err:#}"));
        self.display_text = format!("sample failed: {err:#}");
    }

    pub fn handle_input(
        &mut self,
        event: InputEvent,
        clock: &mut dyn AudioClock,
        renderer: &mut dyn VoiceRenderer,
    ) {
        match event {
            InputEvent::TogglePad(pad) => {
                self.pattern.toggle(pad.voice(), pad.step());
            }
            InputEvent::PlayPress => self.toggle_play(clock, renderer),
            InputEvent::NextParam => self.selected_param = self.selected_param.next(),
            InputEvent::PrevParam => self.selected_param = self.selected_param.prev(),
            InputEvent::AdjustParam(steps) => {
                if let Err(e) = self.params.adjust(self.selected_param, steps) {
                    self.display_text = e.to_string();
                }
            }
            InputEvent::Quit => {}
        }
    }

    /// Stop if playing, otherwise resume the backend and start from step 0.
    pub fn toggle_play(&mut self, clock: &mut dyn AudioClock, renderer: &mut dyn VoiceRenderer) {
        if self.transport.stop() {
            return;
        }
        match self.transport.start(clock) {
            Ok(now) => {
                // anything left from the previous run would fire as a burst
                self.queue.clear();
                self.scheduler.reset(now);
                self.display_text.clear();
                self.on_wake(clock, renderer);
            }
            Err(e) => {
                debug!("play refused: {e}");
                self.display_text = e.to_string();
            }
        }
    }

    /// Scheduler wake-up. Returns how many steps were emitted.
    pub fn on_wake(&mut self, clock: &dyn AudioClock, renderer: &mut dyn VoiceRenderer) -> usize {
        if !self.transport.is_playing() {
            return 0;
        }
        if clock.is_suspended() {
            // a frozen clock would make every step look overdue later
            warn!("audio clock suspended, skipping wake-up");
            return 0;
        }
        self.scheduler.wake(
            clock.current_time(),
            &self.pattern,
            &self.params,
            &mut self.queue,
            renderer,
        )
    }

    /// The tracker only has work while playing or while queued notes remain.
    pub fn tracker_active(&self) -> bool {
        self.transport.is_playing() || !self.queue.is_empty()
    }

    /// Display refresh. Returns the newly audible step, if it changed.
    pub fn on_frame(&mut self, clock: &dyn AudioClock) -> Option<StepIndex> {
        if !self.tracker_active() {
            return None;
        }
        let changed = self.tracker.refresh(clock.current_time(), &mut self.queue);
        if changed.is_some() {
            self.playing_step = changed;
        }
        changed
    }

    pub fn display_state(&self) -> DisplayState {
        let display_text = match (self.display_text.is_empty(), self.transport.asset()) {
            (true, AssetState::Failed(reason)) => format!("sample failed: {reason}"),
            _ => self.display_text.clone(),
        };
        DisplayState {
            pads: self.pattern.cells(),
            playing_step: self.playing_step,
            status: self.transport.status(),
            bpm: self.params.tempo(),
            display_text,
            params: self.params.readouts(),
            selected_param: self.selected_param.index(),
        }
    }

    pub fn settings(&self, base: &Settings) -> Settings {
        Settings { timing: base.timing.clone(), params: self.params.clone() }
    }
}
