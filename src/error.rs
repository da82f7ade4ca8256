use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParamError {
    #[error("{label} must be a finite number, got {value}")]
    NotFinite { label: &'static str, value: f64 },
}

#[derive(Debug, Error, PartialEq)]
pub enum ClockError {
    #[error("audio backend refused to resume: {0}")]
    ResumeFailed(String),
}

#[derive(Debug, Error, PartialEq)]
pub enum TransportError {
    #[error("sample is still loading")]
    AssetLoading,
    #[error("sample failed to load; playback is disabled")]
    AssetFailed,
    #[error(transparent)]
    Clock(#[from] ClockError),
    #[error("audio clock is still suspended after resume")]
    ClockSuspended,
}
