use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::Context;

use super::frame::StereoFrame;

static NEXT_ID: AtomicU64 = AtomicU64::new(0);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SampleId(pub u64);

// atomic so the loader thread can mint ids too
pub fn next_sample_id() -> SampleId {
    SampleId(NEXT_ID.fetch_add(1, Ordering::Relaxed))
}

/// Decoded stereo audio at the output sample rate.
#[derive(Clone, Debug, Default)]
pub struct SampleBuffer {
    pub data: Vec<StereoFrame>,
}

impl SampleBuffer {
    /// Decode by file extension: `.wav` through hound, `.mp3` through minimp3.
    pub fn load(path: &Path, target_rate: u32) -> anyhow::Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("wav") => Self::load_wav(path, target_rate),
            Some("mp3") => Self::load_mp3(path, target_rate),
            _ => anyhow::bail!("{}: only .wav and .mp3 samples are supported", path.display()),
        }
    }

    /// Decode a WAV file, duplicate mono to stereo, and resample to `target_rate`.
    pub fn load_wav(path: &Path, target_rate: u32) -> anyhow::Result<Self> {
        let mut reader = hound::WavReader::open(path)
            .with_context(|| format!("opening {}", path.display()))?;
        let spec = reader.spec();
        let channels = spec.channels as usize;
        if channels == 0 {
            anyhow::bail!("{} has no channels", path.display());
        }

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<Vec<_>, _>>()?,
            hound::SampleFormat::Int => {
                let max = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|x| x as f32 / max))
                    .collect::<Result<Vec<_>, _>>()?
            }
            #[allow(unreachable_patterns)]
            _ => anyhow::bail!("unsupported sample format: {:?}", spec.sample_format),
        };

        let frames = to_stereo(&samples, channels);
        Ok(Self { data: resample_linear(&frames, spec.sample_rate, target_rate) })
    }

    /// Decode an MP3 file frame by frame. The first frame fixes the sample
    /// rate and channel count.
    pub fn load_mp3(path: &Path, target_rate: u32) -> anyhow::Result<Self> {
        let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
        let mut decoder = minimp3::Decoder::new(BufReader::new(file));

        let mut format: Option<(u32, usize)> = None;
        let mut samples: Vec<f32> = Vec::new();
        loop {
            match decoder.next_frame() {
                Ok(frame) => {
                    let (_, channels) = *format.get_or_insert((frame.sample_rate.max(1) as u32, frame.channels));
                    if frame.channels != channels {
                        anyhow::bail!("{}: channel count changes mid-stream", path.display());
                    }
                    samples.extend(frame.data.iter().map(|s| *s as f32 / 32768.0));
                }
                Err(minimp3::Error::SkippedData) => continue,
                Err(minimp3::Error::Io(e)) => {
                    return Err(e).with_context(|| format!("reading {}", path.display()));
                }
                // Eof, or a truncated last frame
                Err(_) => break,
            }
        }

        let Some((rate, channels)) = format.filter(|(_, ch)| *ch > 0) else {
            anyhow::bail!("{}: no mp3 frames found", path.display());
        };
        let frames = to_stereo(&samples, channels);
        Ok(Self { data: resample_linear(&frames, rate, target_rate) })
    }
}

// Interleaved samples to stereo frames; mono is duplicated, channels past
// the first two are ignored.
fn to_stereo(samples: &[f32], channels: usize) -> Vec<StereoFrame> {
    samples
        .chunks_exact(channels)
        .map(|c| StereoFrame {
            left: c[0],
            right: if channels > 1 { c[1] } else { c[0] },
        })
        .collect()
}

fn resample_linear(frames: &[StereoFrame], source_rate: u32, target_rate: u32) -> Vec<StereoFrame> {
    if source_rate == target_rate || frames.is_empty() {
        return frames.to_vec();
    }
    let ratio = target_rate as f64 / source_rate as f64;
    let out_len = (frames.len() as f64 * ratio).ceil() as usize;
    let last = frames.len() - 1;

    (0..out_len)
        .map(|i| {
            let src_pos = i as f64 / ratio;
            let idx = src_pos.floor() as usize;
            if idx >= last {
                return frames[last];
            }
            let frac = (src_pos - idx as f64) as f32;
            let (a, b) = (frames[idx], frames[idx + 1]);
            StereoFrame {
                left: a.left * (1.0 - frac) + b.left * frac,
                right: a.right * (1.0 - frac) + b.right * frac,
            }
        })
        .collect()
}
