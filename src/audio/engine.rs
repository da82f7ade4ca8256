use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::clock::FrameClock;
use super::frame::StereoFrame;
use super::sample_buffer::{SampleBuffer, SampleId};
use super::voice::Voice;
use crate::audio_api::{AudioCommand, ScheduledVoice};

pub const MAX_VOICES: usize = 64; // hard cap so we wont malloc in audio callback

struct ActiveVoice {
    start_frame: u64,
    voice: Voice,
}

/// Runs inside the output callback. Owns every in-flight voice and is the
/// only writer of the audio clock.
pub struct Engine {
    clock: FrameClock,
    samples: HashMap<SampleId, SampleBuffer>,
    voices: Vec<ActiveVoice>, // fixed pool, capacity MAX_VOICES
    seeds: SmallRng,          // one noise seed per started voice
    dropped: Arc<AtomicU64>,  // read and logged by the control thread
}

impl Engine {
    pub fn new(clock: FrameClock) -> Self {
        Self {
            clock,
            samples: HashMap::new(),
            voices: Vec::with_capacity(MAX_VOICES),
            seeds: SmallRng::seed_from_u64(0x9e37_79b9),
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn handle_cmd(&mut self, cmd: AudioCommand) {
        match cmd {
            AudioCommand::RegisterSample { id, buffer } => {
                self.samples.insert(id, buffer);
            }
            AudioCommand::Start(voice) => self.start_voice(voice),
        }
    }

    /// Count of voices dropped because the pool was full. Shared with the
    /// control thread, which does the logging.
    pub fn drop_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.dropped)
    }

    #[cfg(test)]
    pub fn active_voices(&self) -> usize {
        self.voices.len()
    }

    #[cfg(test)]
    pub fn dropped_voices(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    fn start_voice(&mut self, v: ScheduledVoice) {
        if self.voices.len() >= MAX_VOICES {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return;
        }
        // a start time already in the past plays from the next rendered frame
        let start_frame = self.clock.frame_at(v.start_time).max(self.clock.frames());
        let seed = self.seeds.random::<u64>();
        let voice = Voice::from_spec(&v.spec, self.clock.sample_rate(), seed);
        self.voices.push(ActiveVoice { start_frame, voice });
    }

    /// Render the next block and advance the audio clock by its length.
    pub fn render_block(&mut self, out: &mut [StereoFrame]) {
        out.fill(StereoFrame::zero());
        let block_start = self.clock.frames();
        let block_end = block_start + out.len() as u64;

        let samples = &self.samples;
        self.voices.retain_mut(|v| {
            if v.start_frame >= block_end {
                return true; // not due yet
            }
            // sample-accurate start inside the block
            let offset = (v.start_frame.saturating_sub(block_start)) as usize;
            v.voice.render_into(&mut out[offset..], samples)
        });

        self.clock.advance(out.len() as u64);
    }
}
