// Decode the sample asset off the control thread. The result comes back on
// a channel the main loop polls; a panicking or vanished loader counts as a
// failed load, never as "still loading".

use std::path::{Path, PathBuf};
use std::thread;

use crossbeam_channel::{Receiver, TryRecvError};
use tracing::{info, warn};

use crate::audio::{next_sample_id, SampleBuffer, SampleId};

pub type LoadResult = anyhow::Result<(SampleId, SampleBuffer)>;

// Load a WAV or MP3 from disk, ready for registration with the engine
pub fn load(path: &Path, target_rate: u32) -> LoadResult {
    let buffer = SampleBuffer::load(path, target_rate)?;
    Ok((next_sample_id(), buffer))
}

pub struct PendingSample {
    path: PathBuf,
    rx: Receiver<LoadResult>,
}

impl PendingSample {
    /// `Some` exactly once, when the load has finished one way or the other.
    pub fn poll(&self) -> Option<LoadResult> {
        match self.rx.try_recv() {
            Ok(result) => {
                match &result {
                    Ok((_, buf)) => info!(path = %self.path.display(), frames = buf.data.len(), "sample decoded"),
                    Err(e) => warn!(path = %self.path.display(), "sample failed to load: {e:#}"),
                }
                Some(result)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                Some(Err(anyhow::anyhow!("loader for {} exited without a result", self.path.display())))
            }
        }
    }
}

pub fn spawn_load(path: PathBuf, target_rate: u32) -> PendingSample {
    let (tx, rx) = crossbeam_channel::bounded(1);
    let job_path = path.clone();
    thread::spawn(move || {
        let _ = tx.send(load(&job_path, target_rate));
    });
    PendingSample { path, rx }
}
