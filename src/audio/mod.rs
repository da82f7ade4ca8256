use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;
use crossbeam_channel::{Receiver, Sender};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use tracing::{info, warn};

use crate::audio_api::AudioCommand;
use crate::error::ClockError;

mod clock;
mod engine;
mod filter;
mod frame;
mod sample_buffer;
mod voice;

#[cfg(test)]
pub use clock::ManualClock;
pub use clock::{AudioClock, FrameClock};
pub use frame::StereoFrame;
pub use sample_buffer::{next_sample_id, SampleBuffer, SampleId};

use engine::Engine;

const COMMAND_CAPACITY: usize = 1024;

/// Control-thread side of the audio backend: the command channel into the
/// engine, plus the audio clock the engine drives.
pub struct AudioHandle {
    tx: Sender<AudioCommand>,
    clock: FrameClock,
    suspended: bool,
    dropped: Arc<AtomicU64>,
    stream: cpal::Stream,
}

impl AudioHandle {
    pub fn send(&self, cmd: AudioCommand) {
        let _ = self.tx.try_send(cmd);
    }

    pub fn sender(&self) -> Sender<AudioCommand> {
        self.tx.clone()
    }

    pub fn sample_rate(&self) -> u32 {
        self.clock.sample_rate()
    }

    /// Voices the engine has dropped so far because its pool was full.
    pub fn dropped_voices(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl AudioClock for AudioHandle {
    fn current_time(&self) -> f64 {
        self.clock.seconds()
    }

    fn is_suspended(&self) -> bool {
        self.suspended
    }

    fn resume(&mut self) -> Result<(), ClockError> {
        self.stream
            .play()
            .map_err(|e| ClockError::ResumeFailed(e.to_string()))?;
        self.suspended = false;
        info!("audio backend resumed");
        Ok(())
    }
}

/// Open the default output device. The stream starts suspended; the
/// transport resumes it on first play.
pub fn start_audio() -> anyhow::Result<AudioHandle> {
    let (tx, rx) = crossbeam_channel::bounded::<AudioCommand>(COMMAND_CAPACITY);

    let host = cpal::default_host();
    let device = host.default_output_device().context("no default output device")?;
    let config = device.default_output_config().context("no default output config")?;

    let sample_rate: u32 = config.sample_rate();
    let channels = config.channels() as usize;
    let clock = FrameClock::new(sample_rate);
    let engine = Engine::new(clock.clone());
    let dropped = engine.drop_counter();

    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => build_output_stream_f32(&device, &config.into(), rx, engine, channels)?,
        other => anyhow::bail!("unsupported sample format {other:?} (only f32 supported for now)"),
    };

    // some hosts start streams on creation; hold it until the transport asks
    let suspended = match stream.pause() {
        Ok(()) => true,
        Err(e) => {
            warn!("could not pause new stream, treating it as running: {e}");
            stream.play().context("failed to play output stream")?;
            false
        }
    };
    info!(sample_rate, channels, "audio output ready");

    Ok(AudioHandle { tx, clock, suspended, dropped, stream })
}

fn build_output_stream_f32(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    rx: Receiver<AudioCommand>,
    mut engine: Engine,
    channels: usize,
) -> anyhow::Result<cpal::Stream> {
    let mut scratch: Vec<StereoFrame> = vec![StereoFrame::zero(); 4096];

    let err_fn = |err| warn!("audio output stream error: {err}");

    let stream = device.build_output_stream(
        config,
        move |data: &mut [f32], _info| {
            while let Ok(cmd) = rx.try_recv() {
                engine.handle_cmd(cmd);
            }

            let n_frames = data.len() / channels.max(1);
            if scratch.len() < n_frames {
                scratch.resize(n_frames, StereoFrame::zero());
            }
            let frames = &mut scratch[..n_frames];
            engine.render_block(frames);

            for (chunk, frame) in data.chunks_exact_mut(channels.max(1)).zip(frames.iter()) {
                if chunk.len() == 1 {
                    chunk[0] = frame.mono();
                    continue;
                }
                for (i, sample) in chunk.iter_mut().enumerate() {
                    *sample = match i {
                        0 => frame.left,
                        1 => frame.right,
                        _ => 0.0,
                    };
                }
            }
        },
        err_fn,
        None,
    )?;

    Ok(stream)
}
