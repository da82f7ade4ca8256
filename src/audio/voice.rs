use std::collections::HashMap;
use std::f64::consts::TAU;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::filter::{BandPass, DEFAULT_Q};
use super::frame::StereoFrame;
use super::sample_buffer::{SampleBuffer, SampleId};
use crate::audio_api::VoiceSpec;

/// Fixed mix level per voice; four voices in unison still leave headroom.
pub const VOICE_GAIN: f32 = 0.25;

// Sine partials of the sweep's periodic wave (fundamental first).
const SWEEP_PARTIALS: [f64; 5] = [1.0, 0.6, 0.3, 0.15, 0.05];

#[inline]
fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a * (1.0 - t) + b * t
}

#[derive(Clone, Debug)]
enum Kind {
    Sweep { freq: f64, attack: f64, release: f64, length: u64 },
    Pulse { freq: f64, lfo_hz: f64, length: u64 },
    Noise { filter: BandPass, rng: SmallRng, length: u64 },
    Sample { id: SampleId, pos: f64, rate: f64 },
}

/// A one-shot voice. Built fresh for every triggered step, never reused;
/// once `render_into` reports it finished the engine drops it.
#[derive(Clone, Debug)]
pub struct Voice {
    kind: Kind,
    age: u64, // frames rendered since the voice started
    sample_rate: f64,
}

impl Voice {
    pub fn from_spec(spec: &VoiceSpec, sample_rate: u32, seed: u64) -> Self {
        let sr = sample_rate as f64;
        let frames = |secs: f64| (secs.max(0.0) * sr).round() as u64;
        let kind = match *spec {
            VoiceSpec::SweptTone { freq, attack, release, length } => Kind::Sweep {
                freq,
                attack,
                release,
                length: frames(length),
            },
            VoiceSpec::PulseTone { freq, lfo_hz, length } => Kind::Pulse {
                freq,
                lfo_hz,
                length: frames(length),
            },
            VoiceSpec::NoiseBurst { duration, band_hz } => Kind::Noise {
                filter: BandPass::new(band_hz, DEFAULT_Q, sr),
                rng: SmallRng::seed_from_u64(seed),
                length: frames(duration),
            },
            VoiceSpec::Sample { id, rate } => Kind::Sample { id, pos: 0.0, rate: rate.max(0.0) },
        };
        Self { kind, age: 0, sample_rate: sr }
    }

    /// Mix this voice into `out`, starting at `out[0]`. Returns whether the
    /// voice still has frames left to play.
    pub fn render_into(&mut self, out: &mut [StereoFrame], samples: &HashMap<SampleId, SampleBuffer>) -> bool {
        if let Kind::Sample { id, pos, rate } = &mut self.kind {
            // buffer not registered (or gone): nothing to play
            let Some(buffer) = samples.get(&*id) else {
                return false;
            };
            let alive = render_sample(buffer, pos, *rate, out);
            self.age += out.len() as u64;
            return alive;
        }

        let sr = self.sample_rate;
        for frame in out.iter_mut() {
            let t = self.age as f64 / sr;
            let s = match &mut self.kind {
                Kind::Sweep { freq, attack, release, length } => {
                    if self.age >= *length {
                        return false;
                    }
                    sweep_wave(*freq * t) * sweep_gain(t, *attack, *release, *length as f64 / sr)
                }
                Kind::Pulse { freq, lfo_hz, length } => {
                    if self.age >= *length {
                        return false;
                    }
                    // square LFO added onto a base gain of 1 → on/off tremolo
                    let square = if (*lfo_hz * t).fract() < 0.5 { 1.0 } else { -1.0 };
                    (TAU * *freq * t).sin() * (1.0 + square)
                }
                Kind::Noise { filter, rng, length } => {
                    if self.age >= *length {
                        return false;
                    }
                    filter.process(white(rng))
                }
                Kind::Sample { .. } => return false,
            };
            let s = s as f32 * VOICE_GAIN;
            frame.left += s;
            frame.right += s;
            self.age += 1;
        }
        !self.finished()
    }

    fn finished(&self) -> bool {
        match &self.kind {
            Kind::Sweep { length, .. } | Kind::Pulse { length, .. } | Kind::Noise { length, .. } => {
                self.age >= *length
            }
            Kind::Sample { .. } => false,
        }
    }
}

// uniform in [-1, 1)
fn white(rng: &mut SmallRng) -> f64 {
    rng.random_range(-1.0..1.0)
}

fn render_sample(buffer: &SampleBuffer, pos: &mut f64, rate: f64, out: &mut [StereoFrame]) -> bool {
    let data = &buffer.data;
    let len = data.len();
    if len == 0 || rate <= 0.0 {
        return false;
    }
    for frame in out.iter_mut() {
        let i = *pos as usize;
        if i >= len {
            return false;
        }
        let frac = (*pos - i as f64) as f32;
        let s0 = data[i];
        let s1 = data.get(i + 1).copied().unwrap_or(s0);
        frame.left += lerp(s0.left, s1.left, frac) * VOICE_GAIN;
        frame.right += lerp(s0.right, s1.right, frac) * VOICE_GAIN;
        *pos += rate;
    }
    (*pos as usize) < len
}

/// Periodic wave normalised so its peak never exceeds 1. `cycles` is
/// frequency times elapsed seconds.
fn sweep_wave(cycles: f64) -> f64 {
    let norm: f64 = SWEEP_PARTIALS.iter().sum();
    SWEEP_PARTIALS
        .iter()
        .enumerate()
        .map(|(k, amp)| amp * (TAU * (k + 1) as f64 * cycles).sin())
        .sum::<f64>()
        / norm
}

/// 0 → 1 over `attack`, then 1 → 0 ending at `length - release`.
fn sweep_gain(t: f64, attack: f64, release: f64, length: f64) -> f64 {
    let fade_end = length - release;
    if t < attack {
        return t / attack;
    }
    if t >= fade_end {
        return 0.0;
    }
    1.0 - (t - attack) / (fade_end - attack)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SR: u32 = 1000;

    fn render(voice: &mut Voice, frames: usize, samples: &HashMap<SampleId, SampleBuffer>) -> (Vec<StereoFrame>, bool) {
        let mut out = vec![StereoFrame::zero(); frames];
        let alive = voice.render_into(&mut out, samples);
        (out, alive)
    }

    #[test]
    fn sweep_gain_shape() {
        assert_eq!(sweep_gain(0.0, 0.2, 0.5, 2.0), 0.0);
        assert!((sweep_gain(0.1, 0.2, 0.5, 2.0) - 0.5).abs() < 1e-12);
        assert_eq!(sweep_gain(0.2, 0.2, 0.5, 2.0), 1.0);
        assert!((sweep_gain(0.85, 0.2, 0.5, 2.0) - 0.5).abs() < 1e-12);
        assert_eq!(sweep_gain(1.5, 0.2, 0.5, 2.0), 0.0);
        assert_eq!(sweep_gain(1.9, 0.2, 0.5, 2.0), 0.0);
        // zero attack starts at full level
        assert_eq!(sweep_gain(0.0, 0.0, 0.5, 2.0), 1.0);
    }

    #[test]
    fn sweep_runs_for_its_fixed_length() {
        let spec = VoiceSpec::SweptTone { freq: 5.0, attack: 0.2, release: 0.5, length: 2.0 };
        let mut v = Voice::from_spec(&spec, SR, 1);
        let none = HashMap::new();
        let (_, alive) = render(&mut v, 1999, &none);
        assert!(alive);
        let (_, alive) = render(&mut v, 1, &none);
        assert!(!alive);
    }

    #[test]
    fn pulse_is_silenced_by_the_lfo_half_the_time() {
        let spec = VoiceSpec::PulseTone { freq: 100.0, lfo_hz: 10.0, length: 1.0 };
        let mut v = Voice::from_spec(&spec, SR, 1);
        let (out, alive) = render(&mut v, 1000, &HashMap::new());
        assert!(!alive);
        // second half of every LFO cycle is the "off" phase
        for (i, f) in out.iter().enumerate() {
            if (55..95).contains(&(i % 100)) {
                assert_eq!(f.left, 0.0, "frame {i} should be gated off");
            }
        }
        assert!(out.iter().any(|f| f.left.abs() > 0.1));
    }

    #[test]
    fn zero_length_noise_finishes_immediately() {
        let spec = VoiceSpec::NoiseBurst { duration: 0.0, band_hz: 1000.0 };
        let mut v = Voice::from_spec(&spec, SR, 9);
        let (out, alive) = render(&mut v, 16, &HashMap::new());
        assert!(!alive);
        assert!(out.iter().all(|f| f.left == 0.0));
    }

    #[test]
    fn noise_length_follows_duration() {
        let spec = VoiceSpec::NoiseBurst { duration: 0.5, band_hz: 100.0 };
        let mut v = Voice::from_spec(&spec, SR, 9);
        let (out, alive) = render(&mut v, 600, &HashMap::new());
        assert!(!alive);
        assert!(out[..500].iter().any(|f| f.left != 0.0));
        assert!(out[500..].iter().all(|f| f.left == 0.0));
    }

    #[test]
    fn sample_plays_at_rate_until_buffer_end() {
        let id = SampleId(1);
        let buffer = SampleBuffer {
            data: (0..100).map(|i| StereoFrame { left: i as f32, right: -(i as f32) }).collect(),
        };
        let samples = HashMap::from([(id, buffer)]);

        let mut v = Voice::from_spec(&VoiceSpec::Sample { id, rate: 2.0 }, SR, 0);
        let (out, alive) = render(&mut v, 60, &samples);
        assert!(!alive);
        assert_eq!(out[10].left, 20.0 * VOICE_GAIN);
        assert_eq!(out[10].right, -20.0 * VOICE_GAIN);
        assert!(out[50..].iter().all(|f| f.left == 0.0));
    }

    #[test]
    fn unregistered_sample_is_silent() {
        let mut v = Voice::from_spec(&VoiceSpec::Sample { id: SampleId(404), rate: 1.0 }, SR, 0);
        let (out, alive) = render(&mut v, 8, &HashMap::new());
        assert!(!alive);
        assert!(out.iter().all(|f| f.left == 0.0 && f.right == 0.0));
    }

    #[test]
    fn white_noise_stays_in_half_open_range() {
        let mut rng = SmallRng::seed_from_u64(42);
        let draws: Vec<f64> = (0..100_000).map(|_| white(&mut rng)).collect();
        assert!(draws.iter().all(|x| (-1.0..1.0).contains(x)));
        assert!(draws.iter().any(|x| *x < -0.99) && draws.iter().any(|x| *x > 0.99));
    }

    #[test]
    fn same_seed_gives_same_burst() {
        let spec = VoiceSpec::NoiseBurst { duration: 0.1, band_hz: 500.0 };
        let (a, _) = render(&mut Voice::from_spec(&spec, SR, 7), 100, &HashMap::new());
        let (b, _) = render(&mut Voice::from_spec(&spec, SR, 7), 100, &HashMap::new());
        let (c, _) = render(&mut Voice::from_spec(&spec, SR, 8), 100, &HashMap::new());
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn sweep_wave_peak_is_bounded() {
        let peak = (0..10_000)
            .map(|i| sweep_wave(i as f64 / 10_000.0).abs())
            .fold(0.0, f64::max);
        assert!(peak <= 1.0 && peak > 0.5);
    }
}
