// Live parameters, changed at any time from the UI and read by the voice
// renderers at the moment they are invoked.

use serde::{Deserialize, Serialize};

use crate::error::ParamError;
use crate::shared::ParamReadout;

pub const NUM_PARAMS: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Tempo,
    Attack,
    Release,
    PulseHz,
    LfoHz,
    NoiseDuration,
    BandHz,
    PlaybackRate,
}

impl ParamKind {
    pub const ALL: [ParamKind; NUM_PARAMS] = [
        ParamKind::Tempo,
        ParamKind::Attack,
        ParamKind::Release,
        ParamKind::PulseHz,
        ParamKind::LfoHz,
        ParamKind::NoiseDuration,
        ParamKind::BandHz,
        ParamKind::PlaybackRate,
    ];

    /// Inclusive (min, max) bounds.
    pub fn range(self) -> (f64, f64) {
        match self {
            ParamKind::Tempo => (60.0, 180.0),
            ParamKind::Attack => (0.0, 1.0),
            ParamKind::Release => (0.0, 1.0),
            ParamKind::PulseHz => (660.0, 1320.0),
            ParamKind::LfoHz => (20.0, 40.0),
            ParamKind::NoiseDuration => (0.0, 2.0),
            ParamKind::BandHz => (400.0, 1200.0),
            ParamKind::PlaybackRate => (0.1, 2.0),
        }
    }

    pub fn step_size(self) -> f64 {
        match self {
            ParamKind::Tempo | ParamKind::PulseHz | ParamKind::LfoHz | ParamKind::BandHz => 1.0,
            _ => 0.1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ParamKind::Tempo => "BPM",
            ParamKind::Attack => "ATTACK",
            ParamKind::Release => "RELEASE",
            ParamKind::PulseHz => "PULSE HZ",
            ParamKind::LfoHz => "LFO HZ",
            ParamKind::NoiseDuration => "NOISE DUR",
            ParamKind::BandHz => "BAND HZ",
            ParamKind::PlaybackRate => "RATE",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            ParamKind::Tempo => "bpm",
            ParamKind::Attack | ParamKind::Release | ParamKind::NoiseDuration => "s",
            ParamKind::PulseHz | ParamKind::LfoHz | ParamKind::BandHz => "Hz",
            ParamKind::PlaybackRate => "x",
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % NUM_PARAMS]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + NUM_PARAMS - 1) % NUM_PARAMS]
    }

    pub fn index(self) -> usize {
        Self::ALL.iter().position(|k| *k == self).unwrap_or(0)
    }
}

/// Current values of every live parameter. Fields are private so nothing
/// can bypass the clamping in [`LiveParams::set`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveParams {
    tempo: f64,
    attack: f64,
    release: f64,
    pulse_hz: f64,
    lfo_hz: f64,
    noise_duration: f64,
    band_hz: f64,
    playback_rate: f64,
}

impl Default for LiveParams {
    fn default() -> Self {
        Self {
            tempo: 60.0,
            attack: 0.2,
            release: 0.5,
            pulse_hz: 880.0,
            lfo_hz: 30.0,
            noise_duration: 1.0,
            band_hz: 1000.0,
            playback_rate: 1.0,
        }
    }
}

impl LiveParams {
    pub fn get(&self, kind: ParamKind) -> f64 {
        match kind {
            ParamKind::Tempo => self.tempo,
            ParamKind::Attack => self.attack,
            ParamKind::Release => self.release,
            ParamKind::PulseHz => self.pulse_hz,
            ParamKind::LfoHz => self.lfo_hz,
            ParamKind::NoiseDuration => self.noise_duration,
            ParamKind::BandHz => self.band_hz,
            ParamKind::PlaybackRate => self.playback_rate,
        }
    }

    /// Clamp `value` into the parameter's range and store it. Non-finite
    /// input is rejected and the previous value kept.
    pub fn set(&mut self, kind: ParamKind, value: f64) -> Result<f64, ParamError> {
        if !value.is_finite() {
            return Err(ParamError::NotFinite { label: kind.label(), value });
        }
        let (min, max) = kind.range();
        let value = value.clamp(min, max);
        let slot = match kind {
            ParamKind::Tempo => &mut self.tempo,
            ParamKind::Attack => &mut self.attack,
            ParamKind::Release => &mut self.release,
            ParamKind::PulseHz => &mut self.pulse_hz,
            ParamKind::LfoHz => &mut self.lfo_hz,
            ParamKind::NoiseDuration => &mut self.noise_duration,
            ParamKind::BandHz => &mut self.band_hz,
            ParamKind::PlaybackRate => &mut self.playback_rate,
        };
        *slot = value;
        Ok(value)
    }

    /// Nudge by `steps` multiples of the parameter's step size.
    pub fn adjust(&mut self, kind: ParamKind, steps: f64) -> Result<f64, ParamError> {
        let target = self.get(kind) + steps * kind.step_size();
        // snap to the step grid so repeated nudges don't accumulate float noise
        let step = kind.step_size();
        self.set(kind, (target / step).round() * step)
    }

    /// Re-run every value through the input boundary, e.g. after loading
    /// values from disk.
    pub fn sanitized(&self) -> Self {
        let mut out = Self::default();
        for kind in ParamKind::ALL {
            let _ = out.set(kind, self.get(kind));
        }
        out
    }

    /// Seconds per step. Tempo is clamped to a positive minimum, so this is
    /// always finite and greater than zero.
    pub fn beat_duration(&self) -> f64 {
        60.0 / self.tempo
    }

    pub fn tempo(&self) -> f64 { self.tempo }
    pub fn attack(&self) -> f64 { self.attack }
    pub fn release(&self) -> f64 { self.release }
    pub fn pulse_hz(&self) -> f64 { self.pulse_hz }
    pub fn lfo_hz(&self) -> f64 { self.lfo_hz }
    pub fn noise_duration(&self) -> f64 { self.noise_duration }
    pub fn band_hz(&self) -> f64 { self.band_hz }
    pub fn playback_rate(&self) -> f64 { self.playback_rate }

    pub fn readouts(&self) -> Vec<ParamReadout> {
        ParamKind::ALL
            .iter()
            .map(|k| ParamReadout { label: k.label(), value: self.get(*k), unit: k.unit() })
            .collect()
    }
}
