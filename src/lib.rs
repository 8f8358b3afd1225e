//! # Cantor - Karaoke Singing Judge
//!
//! Turns a live microphone signal into a graded singing performance.
//!
//! ## Architecture
//!
//! Cantor is an umbrella crate that coordinates:
//! - **cantor-core** - Ring buffer, song model, configuration, remote pitch queue
//! - **cantor-pitch** - Pitch estimators (YIN, dynamic wavelet, CAMDF) and quantization
//! - **cantor-judge** - Beat scheduler, joker rule, score engine
//!
//! ## Quick Start
//!
//! ```ignore
//! use cantor::prelude::*;
//!
//! let mut session = Session::builder()
//!     .song(song)
//!     .player(PlayerSetup::microphone("P1", DeviceConfig::default()))
//!     .build()?;
//!
//! // Once per frame
//! session.write_samples(0, &captured)?;
//! session.tick(playback_position_ms);
//!
//! let total = session.players()[0].snapshot().total;
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Judging pipeline
//! - `judge` - Scheduler, score engine and `Session`
//! - `serialization` - serde derives on configuration, song and event types

/// Re-export of cantor-core for direct access
pub use cantor_core as core;

/// Re-export of cantor-pitch for direct access
pub use cantor_pitch as pitch;

pub use cantor_core::{
    remote_pitch_queue, AudioRingBuffer, DeviceConfig, Difficulty, JudgeConfig, Note, NoteKind,
    PitchAlgorithm, PitchRange, RemotePitchConsumer, RemotePitchEvent, RemotePitchProducer,
    Sentence, Song,
};

pub use cantor_pitch::{
    CamdfEstimator, DywaEstimator, PitchDetector, PitchEstimator, PitchEvent, PitchTrack,
    PitchTrackJob, SemitoneQuantizer, TrackProgress, YinEstimator,
};

#[cfg(feature = "judge")]
pub use cantor_judge as judge;

#[cfg(feature = "judge")]
pub use cantor_judge::{
    AnalysisScheduler, BeatAnalyzed, BeatSampleMapper, JudgeEvent, NoteAnalyzed, NoteScore,
    RecordedNote, SchedulerState, ScoreConfig, ScoreEngine, ScoreReadout, ScoreSnapshot,
    SentenceAnalyzed, SentenceRating, SentenceScore,
};

mod error;
pub use error::{Error, Result};

#[cfg(feature = "judge")]
mod builder;
#[cfg(feature = "judge")]
mod session;

#[cfg(feature = "judge")]
pub use builder::SessionBuilder;
#[cfg(feature = "judge")]
pub use session::{PlayerInput, PlayerJudge, PlayerSetup, Session};

/// Convenience prelude for common imports
pub mod prelude {
    // Song model and configuration
    pub use crate::{
        DeviceConfig, Difficulty, JudgeConfig, Note, NoteKind, PitchAlgorithm, PitchRange,
        Sentence, Song,
    };

    // Pitch detection
    pub use crate::{PitchDetector, PitchEvent, SemitoneQuantizer};

    // Judging
    #[cfg(feature = "judge")]
    pub use crate::{
        PlayerSetup, ScoreConfig, ScoreSnapshot, SentenceRating, Session, SessionBuilder,
    };
}
