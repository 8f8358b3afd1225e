//! Centralized error type for the cantor umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] cantor_core::Error),

    #[error("Pitch: {0}")]
    Pitch(#[from] cantor_pitch::Error),

    #[cfg(feature = "judge")]
    #[error("Judge: {0}")]
    Judge(#[from] cantor_judge::Error),

    #[error("Session has no song")]
    MissingSong,

    #[error("Unknown player {0}")]
    UnknownPlayer(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
