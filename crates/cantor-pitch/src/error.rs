//! Error types for cantor-pitch.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] cantor_core::Error),

    #[error("Invalid analysis window: size={window_size}, hop={hop}")]
    InvalidWindow { window_size: usize, hop: usize },

    #[error("Pitch tracking was cancelled")]
    Cancelled,

    #[error("Pitch tracking worker panicked")]
    WorkerPanicked,
}

pub type Result<T> = core::result::Result<T, Error>;
