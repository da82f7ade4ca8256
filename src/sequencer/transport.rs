// Start/stop state. Playback is gated on the sample asset: the play control
// stays disabled until the sample has decoded, and forever if it failed.

use tracing::{info, warn};

use crate::audio::AudioClock;
use crate::error::TransportError;
use crate::shared::TransportStatus;

#[derive(Clone, Debug, PartialEq)]
pub enum AssetState {
    Loading,
    Ready,
    Failed(String),
}

#[derive(Clone, Debug)]
pub struct Transport {
    asset: AssetState,
    playing: bool,
}

impl Default for Transport {
    fn default() -> Self {
        Self { asset: AssetState::Loading, playing: false }
    }
}

impl Transport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asset(&self) -> &AssetState {
        &self.asset
    }

    pub fn asset_ready(&mut self) {
        self.asset = AssetState::Ready;
    }

    pub fn asset_failed(&mut self, reason: impl Into<String>) {
        self.asset = AssetState::Failed(reason.into());
        self.playing = false;
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn status(&self) -> TransportStatus {
        match (&self.asset, self.playing) {
            (AssetState::Loading, _) => TransportStatus::Loading,
            (AssetState::Failed(_), _) => TransportStatus::Failed,
            (AssetState::Ready, true) => TransportStatus::Playing,
            (AssetState::Ready, false) => TransportStatus::Ready,
        }
    }

    /// Enter the playing state. The audio backend is resumed first; if that
    /// fails, or the clock is still frozen afterwards, nothing changes.
    /// Returns the clock time playback starts from.
    pub fn start(&mut self, clock: &mut dyn AudioClock) -> Result<f64, TransportError> {
        match self.asset {
            AssetState::Loading => return Err(TransportError::AssetLoading),
            AssetState::Failed(_) => return Err(TransportError::AssetFailed),
            AssetState::Ready => {}
        }
        if clock.is_suspended() {
            if let Err(e) = clock.resume() {
                warn!("resume failed, not starting: {e}");
                return Err(e.into());
            }
            if clock.is_suspended() {
                return Err(TransportError::ClockSuspended);
            }
        }
        self.playing = true;
        let now = clock.current_time();
        info!(now, "transport started");
        Ok(now)
    }

    /// Halt future wake-ups. Voices already issued play out on their own.
    pub fn stop(&mut self) -> bool {
        let was_playing = std::mem::replace(&mut self.playing, false);
        if was_playing {
            info!("transport stopped");
        }
        was_playing
    }
}
