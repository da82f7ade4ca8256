use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::ClockError;

/// High-resolution, monotonic time reference for all absolute scheduling.
pub trait AudioClock {
    /// Seconds of audio the backend has rendered so far.
    fn current_time(&self) -> f64;

    /// A suspended backend doesn't render, so its clock is frozen.
    fn is_suspended(&self) -> bool;

    fn resume(&mut self) -> Result<(), ClockError>;
}

/// Frame counter shared between the audio callback (the only writer) and
/// the control thread.
#[derive(Clone, Debug)]
pub struct FrameClock {
    frames: Arc<AtomicU64>,
    sample_rate: u32,
}

impl FrameClock {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            frames: Arc::new(AtomicU64::new(0)),
            sample_rate: sample_rate.max(1),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn frames(&self) -> u64 {
        self.frames.load(Ordering::Acquire)
    }

    pub fn advance(&self, n: u64) {
        self.frames.fetch_add(n, Ordering::AcqRel);
    }

    pub fn seconds(&self) -> f64 {
        self.frames() as f64 / self.sample_rate as f64
    }

    /// Nearest frame to an absolute time; negative or non-finite times map
    /// to frame 0.
    pub fn frame_at(&self, time: f64) -> u64 {
        if !time.is_finite() || time <= 0.0 {
            return 0;
        }
        (time * self.sample_rate as f64).round() as u64
    }
}

/// Hand-driven clock for tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ManualClock {
    pub now: f64,
    pub suspended: bool,
    pub refuse_resume: bool,
    pub resume_calls: usize,
}

#[cfg(test)]
impl AudioClock for ManualClock {
    fn current_time(&self) -> f64 {
        self.now
    }

    fn is_suspended(&self) -> bool {
        self.suspended
    }

    fn resume(&mut self) -> Result<(), ClockError> {
        self.resume_calls += 1;
        if self.refuse_resume {
            return Err(ClockError::ResumeFailed("refused".into()));
        }
        self.suspended = false;
        Ok(())
    }
}
