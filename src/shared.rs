// Types shared between the TUI, the middle layer and the sequencer.
//
// Grid layout (voice rows x step columns):
//   1 2 3 4       //  sweep  steps 0..3
//   q w e r       //  pulse  steps 0..3
//   a s d f       //  noise  steps 0..3
//   z x c v       //  sample steps 0..3
//
//   Space         //  PlayPress
//   Tab / BackTab //  NextParam / PrevParam
//   [ / ]         //  AdjustParam(-1.0 / 1.0)
//   { / }         //  AdjustParam(-10.0 / 10.0)
//   Esc           //  Quit
//
// The TUI never interprets sequencer state itself; every frame it asks the
// middle layer for a `DisplayState` and draws that.

pub const NUM_VOICES: usize = 4;
pub const NUM_STEPS: usize = 4;

/// One of the four fixed sound sources, in grid row order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VoiceId {
    Sweep,
    Pulse,
    Noise,
    Sample,
}

impl VoiceId {
    pub const ALL: [VoiceId; NUM_VOICES] = [
        VoiceId::Sweep,
        VoiceId::Pulse,
        VoiceId::Noise,
        VoiceId::Sample,
    ];

    pub fn index(self) -> usize {
        match self {
            VoiceId::Sweep => 0,
            VoiceId::Pulse => 1,
            VoiceId::Noise => 2,
            VoiceId::Sample => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            VoiceId::Sweep => "SWEEP",
            VoiceId::Pulse => "PULSE",
            VoiceId::Noise => "NOISE",
            VoiceId::Sample => "SAMPLE",
        }
    }
}

/// Position in the loop, always in `0..NUM_STEPS`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct StepIndex(u8);

impl StepIndex {
    pub const FIRST: StepIndex = StepIndex(0);
    pub const LAST: StepIndex = StepIndex(NUM_STEPS as u8 - 1);

    #[cfg(test)]
    pub fn new(i: usize) -> Option<Self> {
        (i < NUM_STEPS).then_some(StepIndex(i as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }

    // wraps 3 -> 0
    pub fn next(self) -> Self {
        StepIndex((self.0 + 1) % NUM_STEPS as u8)
    }
}

// ye olde pad id, row-major over the grid above
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PadId(pub u8);

impl PadId {
    pub fn voice(self) -> VoiceId {
        VoiceId::ALL[(self.0 as usize / NUM_STEPS) % NUM_VOICES]
    }

    pub fn step(self) -> StepIndex {
        StepIndex((self.0 as usize % NUM_STEPS) as u8)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum InputEvent {
    TogglePad(PadId),
    PlayPress,
    NextParam,
    PrevParam,
    AdjustParam(f64), // in multiples of the parameter's step size
    Quit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransportStatus {
    Loading,
    Ready,
    Playing,
    Failed,
}

impl TransportStatus {
    pub fn label(self) -> &'static str {
        match self {
            TransportStatus::Loading => "LOADING",
            TransportStatus::Ready => "READY",
            TransportStatus::Playing => "PLAYING",
            TransportStatus::Failed => "FAILED",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ParamReadout {
    pub label: &'static str,
    pub value: f64,
    pub unit: &'static str,
}

#[derive(Clone, Debug)]
pub struct DisplayState {
    pub pads: [[bool; NUM_STEPS]; NUM_VOICES],
    pub playing_step: Option<StepIndex>, // last step reported audible
    pub status: TransportStatus,
    pub bpm: f64,
    pub display_text: String, // load errors and other one-line messages
    pub params: Vec<ParamReadout>,
    pub selected_param: usize,
}
