// Voice renderers: turn "voice X at time T" into a configured one-shot
// voice for the audio engine.

use crossbeam_channel::Sender;
use tracing::{debug, trace};

use crate::audio_api::{AudioCommand, SampleId, ScheduledVoice, VoiceSpec};
use crate::sequencer::params::LiveParams;
use crate::shared::VoiceId;

pub const SWEEP_HZ: f64 = 380.0;
pub const SWEEP_LENGTH: f64 = 2.0;
pub const PULSE_LENGTH: f64 = 1.0;

/// The scheduler's only way of making sound. Implementations are
/// fire-and-forget: there is no error channel back to the scheduler.
pub trait VoiceRenderer {
    fn trigger(&mut self, voice: VoiceId, time: f64, params: &LiveParams);
}

/// Snapshot the parameters a voice needs right now. `None` when the voice
/// can't sound (sample not decoded yet).
pub fn voice_spec(voice: VoiceId, params: &LiveParams, sample: Option<SampleId>) -> Option<VoiceSpec> {
    let spec = match voice {
        VoiceId::Sweep => VoiceSpec::SweptTone {
            freq: SWEEP_HZ,
            attack: params.attack(),
            release: params.release(),
            length: SWEEP_LENGTH,
        },
        VoiceId::Pulse => VoiceSpec::PulseTone {
            freq: params.pulse_hz(),
            lfo_hz: params.lfo_hz(),
            length: PULSE_LENGTH,
        },
        VoiceId::Noise => VoiceSpec::NoiseBurst {
            duration: params.noise_duration(),
            band_hz: params.band_hz(),
        },
        VoiceId::Sample => VoiceSpec::Sample {
            id: sample?,
            rate: params.playback_rate(),
        },
    };
    Some(spec)
}

/// Sends voices to the audio thread over the engine's command channel.
pub struct EngineRenderer {
    tx: Sender<AudioCommand>,
    sample: Option<SampleId>,
}

impl EngineRenderer {
    pub fn new(tx: Sender<AudioCommand>) -> Self {
        Self { tx, sample: None }
    }

    pub fn set_sample(&mut self, id: SampleId) {
        self.sample = Some(id);
    }
}

impl VoiceRenderer for EngineRenderer {
    fn trigger(&mut self, voice: VoiceId, time: f64, params: &LiveParams) {
        let Some(spec) = voice_spec(voice, params, self.sample) else {
            trace!(voice = voice.label(), "no sample registered, trigger ignored");
            return;
        };
        let cmd = AudioCommand::Start(ScheduledVoice { start_time: time, spec });
        if let Err(e) = self.tx.try_send(cmd) {
            debug!(voice = voice.label(), time, "voice dropped: {e}");
        }
    }
}

#[cfg(test)]
#[derive(Clone, Debug, PartialEq)]
pub struct Trigger {
    pub voice: VoiceId,
    pub time: f64,
    pub params: LiveParams,
}

/// Records every invocation instead of making sound.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingRenderer {
    pub calls: Vec<Trigger>,
}

#[cfg(test)]
impl RecordingRenderer {
    pub fn for_voice(&self, voice: VoiceId) -> Vec<&Trigger> {
        self.calls.iter().filter(|t| t.voice == voice).collect()
    }
}

#[cfg(test)]
impl VoiceRenderer for RecordingRenderer {
    fn trigger(&mut self, voice: VoiceId, time: f64, params: &LiveParams) {
        self.calls.push(Trigger { voice, time, params: params.clone() });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequencer::params::ParamKind;

    #[test]
    fn sample_voice_is_silent_until_registered() {
        let (tx, rx) = crossbeam_channel::bounded(8);
        let mut r = EngineRenderer::new(tx);
        let params = LiveParams::default();

        r.trigger(VoiceId::Sample, 1.0, &params);
        assert!(rx.try_recv().is_err());

        let id = SampleId(7);
        r.set_sample(id);
        r.trigger(VoiceId::Sample, 1.0, &params);
        match rx.try_recv() {
            Ok(AudioCommand::Start(v)) => {
                assert_eq!(v.start_time, 1.0);
                assert_eq!(v.spec, VoiceSpec::Sample { id, rate: 1.0 });
            }
            other => panic!("expected a start command, got {other:?}"),
        }
    }

    #[test]
    fn spec_captures_params_at_invocation() {
        let (tx, rx) = crossbeam_channel::bounded(8);
        let mut r = EngineRenderer::new(tx);
        let mut params = LiveParams::default();

        r.trigger(VoiceId::Sweep, 0.0, &params);
        params.set(ParamKind::Attack, 0.8).unwrap();
        r.trigger(VoiceId::Sweep, 0.5, &params);

        let attacks: Vec<f64> = rx
            .try_iter()
            .filter_map(|cmd| match cmd {
                AudioCommand::Start(ScheduledVoice { spec: VoiceSpec::SweptTone { attack, .. }, .. }) => Some(attack),
                _ => None,
            })
            .collect();
        assert_eq!(attacks, vec![0.2, 0.8]);
    }

    #[test]
    fn full_channel_drops_silently() {
        let (tx, rx) = crossbeam_channel::bounded(1);
        let mut r = EngineRenderer::new(tx);
        let params = LiveParams::default();
        r.trigger(VoiceId::Noise, 0.0, &params);
        r.trigger(VoiceId::Noise, 0.5, &params);
        assert_eq!(rx.try_iter().count(), 1);
    }
}
