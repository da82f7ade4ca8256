mod audio;
mod audio_api;
mod cadence;
mod cli;
mod error;
mod loader;
mod logging;
mod middle;
mod pipeline;
mod sequencer;
mod shared;
mod tui;

use std::io::stdout;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::terminal::{self, EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tracing::{debug, info, warn};

use audio::AudioHandle;
use audio_api::AudioCommand;
use cadence::Cadence;
use loader::sample_loader::{self, PendingSample};
use middle::Middle;
use pipeline::persistence;
use sequencer::EngineRenderer;
use shared::InputEvent;

// upper bound on how long the loop blocks waiting for keys
const MAX_IDLE: Duration = Duration::from_millis(100);

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let args = cli::Args::parse();
    logging::init(args.log_file.as_deref(), args.log_level)?;

    let project_dir: PathBuf = args
        .project_dir
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());
    let settings = persistence::load_settings(&project_dir);

    let mut audio = audio::start_audio()?;
    let mut renderer = EngineRenderer::new(audio.sender());
    let mut middle = Middle::new(&settings);
    // play stays disabled until this resolves
    let mut pending = Some(sample_loader::spawn_load(args.sample.clone(), audio.sample_rate()));

    terminal::enable_raw_mode()?;
    let _guard = RawModeGuard; // auto drops when out of scope
    crossterm::execute!(stdout(), EnterAlternateScreen)?;
    let mut term = Terminal::new(CrosstermBackend::new(stdout()))?;
    term.clear()?;

    // Two cooperative tasks on this one thread: scheduler wake-ups (armed
    // only while playing) and the display refresh that also drives the
    // position tracker. Input handling runs between them.
    let mut wake = Cadence::new(settings.timing.lookahead());
    let mut refresh = Cadence::new(settings.timing.frame());
    refresh.arm(Instant::now());
    let mut dropped_seen = 0;
    info!(
        lookahead_ms = settings.timing.lookahead_ms,
        horizon_secs = settings.timing.horizon_secs,
        "stepgrid started"
    );

    loop {
        poll_sample(&mut pending, &audio, &mut renderer, &mut middle);

        let now = Instant::now();
        if wake.poll(now) {
            middle.on_wake(&audio, &mut renderer);
        }
        if refresh.poll(now) {
            middle.on_frame(&audio);
            if let Some(newly) = new_drops(audio.dropped_voices(), &mut dropped_seen) {
                debug!(newly, total = dropped_seen, "voice pool full, voices dropped");
            }
            let ds = middle.display_state();
            term.draw(|frame| {
                let area = frame.area();
                tui::view::render(frame, area, &ds);
            })?;
        }

        let timeout = cadence::next_timeout(&[&wake, &refresh], Instant::now(), MAX_IDLE);
        for event in tui::input::poll_input(timeout)? {
            if event == InputEvent::Quit {
                if let Err(e) = persistence::save_settings(&project_dir, &middle.settings(&settings)) {
                    warn!("settings not saved: {e:#}");
                }
                info!("quit");
                return Ok(());
            }
            middle.handle_input(event, &mut audio, &mut renderer);
        }
        wake.set_active(middle.is_playing(), Instant::now());
    }
}

// Register the decoded sample with the engine once, then unlock the transport.
fn poll_sample(
    pending: &mut Option<PendingSample>,
    audio: &AudioHandle,
    renderer: &mut EngineRenderer,
    middle: &mut Middle,
) {
    let Some(result) = pending.as_ref().and_then(PendingSample::poll) else {
        return;
    };
    *pending = None;
    match result {
        Ok((id, buffer)) => {
            // same channel as voice starts, so it lands before any trigger
            audio.send(AudioCommand::RegisterSample { id, buffer });
            renderer.set_sample(id);
            middle.asset_ready();
        }
        Err(e) => middle.asset_failed(&e),
    }
}

// The engine only counts drops; they are logged here, off the audio thread.
fn new_drops(total: u64, seen: &mut u64) -> Option<u64> {
    let newly = total.checked_sub(*seen).filter(|n| *n > 0)?;
    *seen = total;
    Some(newly)
}

struct RawModeGuard;
impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = crossterm::execute!(stdout(), LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();
    }
}
