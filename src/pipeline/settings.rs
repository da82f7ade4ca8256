// Settings persisted between runs. Patterns are not part of this.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::sequencer::LiveParams;
use crate::sequencer::scheduler::{DEFAULT_HORIZON, DEFAULT_LOOKAHEAD};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingConfig {
    pub lookahead_ms: u64, // scheduler wake-up interval
    pub horizon_secs: f64, // how far ahead notes are scheduled
    pub frame_ms: u64,     // display refresh
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            lookahead_ms: DEFAULT_LOOKAHEAD.as_millis() as u64,
            horizon_secs: DEFAULT_HORIZON,
            frame_ms: 16, // ~60fps
        }
    }
}

// Longer horizons make parameter changes audibly late.
pub const MAX_HORIZON_SECS: f64 = 1.0;

impl TimingConfig {
    /// A wake-up interval at or beyond the horizon would let steps fall due
    /// between wake-ups, so such a pair is replaced by the defaults.
    pub fn sanitized(&self) -> Self {
        let defaults = Self::default();
        let horizon_secs = if self.horizon_secs.is_finite() && self.horizon_secs > 0.0 {
            self.horizon_secs.min(MAX_HORIZON_SECS)
        } else {
            defaults.horizon_secs
        };
        let lookahead_ms = self.lookahead_ms.max(1);
        let (lookahead_ms, horizon_secs) = if lookahead_ms as f64 / 1000.0 < horizon_secs {
            (lookahead_ms, horizon_secs)
        } else {
            (defaults.lookahead_ms, defaults.horizon_secs)
        };
        Self { lookahead_ms, horizon_secs, frame_ms: self.frame_ms.max(1) }
    }

    pub fn lookahead(&self) -> Duration {
        Duration::from_millis(self.lookahead_ms)
    }

    pub fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub timing: TimingConfig,
    pub params: LiveParams,
}

impl Settings {
    /// Clamp everything read from disk through the same rules as live input.
    pub fn sanitized(&self) -> Self {
        Self {
            timing: self.timing.sanitized(),
            params: self.params.sanitized(),
        }
    }
}
