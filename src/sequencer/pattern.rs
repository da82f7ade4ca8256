use crate::shared::{NUM_STEPS, NUM_VOICES, StepIndex, VoiceId};

/// On/off pads, one row per voice. Mutated only by UI input; the scheduler
/// only ever reads it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PatternMatrix {
    cells: [[bool; NUM_STEPS]; NUM_VOICES],
}

impl PatternMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toggle(&mut self, voice: VoiceId, step: StepIndex) -> bool {
        let cell = &mut self.cells[voice.index()][step.index()];
        *cell = !*cell;
        *cell
    }

    #[cfg(test)]
    pub fn set(&mut self, voice: VoiceId, step: StepIndex, on: bool) {
        self.cells[voice.index()][step.index()] = on;
    }

    pub fn is_enabled(&self, voice: VoiceId, step: StepIndex) -> bool {
        self.cells[voice.index()][step.index()]
    }

    /// Voices whose pad is on for `step`, in row order.
    pub fn enabled_voices(&self, step: StepIndex) -> impl Iterator<Item = VoiceId> + '_ {
        VoiceId::ALL
            .into_iter()
            .filter(move |v| self.is_enabled(*v, step))
    }

    pub fn cells(&self) -> [[bool; NUM_STEPS]; NUM_VOICES] {
        self.cells
    }
}
