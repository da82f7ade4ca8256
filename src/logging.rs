use std::fs::File;
use std::path::Path;
use std::sync::Mutex;

use anyhow::Context;

/// Send `tracing` output to `path`. Without a path nothing is installed and
/// events are discarded, since stdout and stderr belong to the TUI.
pub fn init(path: Option<&Path>, level: tracing::Level) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_max_level(level)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing log subscriber: {e}"))?;
    Ok(())
}
