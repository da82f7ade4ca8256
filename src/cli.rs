use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Four-step, four-voice drum machine for the terminal")]
pub struct Args {
    /// WAV or MP3 file played by the sample voice
    #[arg(value_name = "SAMPLE", default_value = "dtmf.mp3")]
    pub sample: PathBuf,

    /// Directory holding .stepgrid/settings.json (defaults to the current directory)
    #[arg(long)]
    pub project_dir: Option<PathBuf>,

    /// Write logs to this file (the terminal belongs to the UI)
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// trace, debug, info, warn or error
    #[arg(long, default_value = "info")]
    pub log_level: tracing::Level,
}
