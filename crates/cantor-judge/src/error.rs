//! Error types for cantor-judge.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] cantor_core::Error),

    #[error(transparent)]
    Pitch(#[from] cantor_pitch::Error),

    #[error("Invalid score configuration: {0}")]
    InvalidScoreConfig(String),
}

pub type Result<T> = core::result::Result<T, Error>;
