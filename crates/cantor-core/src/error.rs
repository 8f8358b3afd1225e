//! Error types for cantor-core.

use thiserror::Error;

/// Error type for cantor-core operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Invalid tempo: {0}. Must be a positive, finite BPM")]
    InvalidTempo(f32),

    #[error("Invalid sample rate: {0}. Must be between 8000 and 192000 Hz")]
    InvalidSampleRate(u32),

    #[error("Invalid song: {0}")]
    InvalidSong(String),

    #[error("Invalid note range: start={start}, end={end}")]
    InvalidNoteRange { start: i32, end: i32 },

    #[error("Capture device not available: {0}")]
    DeviceUnavailable(String),
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;
