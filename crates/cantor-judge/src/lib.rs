//! Beat-synchronized singing judge.
//!
//! For each player an [`AnalysisScheduler`] turns captured audio (or pitch
//! events from a remote device) into per-beat judgements, and a
//! [`ScoreEngine`] turns those judgements into a score.
//!
//! ```text
//! AudioRingBuffer -> BeatSampleMapper -> PitchDetector -> rounding + joker
//!                                                      -> BeatAnalyzed / NoteAnalyzed / SentenceAnalyzed
//!                                                      -> ScoreEngine -> NoteScore / SentenceScore / ScoreSnapshot
//! ```
//!
//! Events fan out over crossbeam channels; the combined [`JudgeEvent`] stream
//! preserves emission order within a tick.

pub mod error;
pub mod events;
pub mod mapper;
pub mod rating;
pub mod recorded;
pub mod rounding;
pub mod scheduler;
pub mod score;

pub use error::{Error, Result};
pub use events::{BeatAnalyzed, Broadcaster, JudgeEvent, NoteAnalyzed, SentenceAnalyzed};
pub use mapper::{BeatSampleMapper, BeatWindow};
pub use rating::{RatingTier, SentenceRating};
pub use recorded::RecordedNote;
pub use rounding::{octave_distance, round_to_target, Joker, RoundedPitch};
pub use scheduler::{AnalysisScheduler, SchedulerState};
pub use score::{
    NoteScore, ScoreBudget, ScoreConfig, ScoreEngine, ScoreReadout, ScoreSnapshot, SentenceScore,
};
