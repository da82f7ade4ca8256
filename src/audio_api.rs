pub use crate::audio::{SampleBuffer, SampleId};

/// Fully-configured one-shot voice. Every value is captured when the
/// renderer is invoked, so later parameter changes never reach a voice
/// that has already been issued.
#[derive(Clone, Debug, PartialEq)]
pub enum VoiceSpec {
    SweptTone { freq: f64, attack: f64, release: f64, length: f64 },
    PulseTone { freq: f64, lfo_hz: f64, length: f64 },
    NoiseBurst { duration: f64, band_hz: f64 },
    Sample { id: SampleId, rate: f64 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct ScheduledVoice {
    pub start_time: f64, // absolute audio-clock seconds
    pub spec: VoiceSpec,
}

#[derive(Clone, Debug)]
pub enum AudioCommand {
    // The engine can't load files (blocks the audio thread), so the loader
    // decodes on its own thread and the buffer is registered here first
    RegisterSample { id: SampleId, buffer: SampleBuffer },

    // Start a voice on the exact frame matching `start_time`
    Start(ScheduledVoice),
}
