//! # Cantor Core
//!
//! Shared building blocks for the cantor singing judge:
//! - **AudioRingBuffer**: the most recent second of captured mono samples
//! - **Song model**: notes, sentences, beat <-> time conversion
//! - **Configuration**: device, pitch range and judging options
//! - **Remote pitch queue**: lock-free hand-off of network pitch events
//!
//! Everything here is single-player and allocation-free on the tick path
//! once constructed; multiple players each own their own instances.

pub mod config;
pub mod error;
pub mod remote;
pub mod ring_buffer;
pub mod song;

pub use config::{DeviceConfig, Difficulty, JudgeConfig, PitchAlgorithm, PitchRange};
pub use error::{Error, Result};
pub use remote::{remote_pitch_queue, RemotePitchConsumer, RemotePitchEvent, RemotePitchProducer};
pub use ring_buffer::{AudioRingBuffer, RingSlice};
pub use song::{Note, NoteKind, NoteLocation, Sentence, Song};
