//! Song structure and beat <-> time conversion.
//!
//! A song is a fixed tempo (beats per minute) plus a gap: the playback
//! position of beat 0. Beats are the judging granularity, so beat numbers
//! are integers in the note model; conversions accept fractional beats.

mod note;
mod sentence;

pub use note::{Note, NoteKind};
pub use sentence::Sentence;

use crate::{Error, Result};

/// Position of a note inside a song.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteLocation {
    pub sentence_index: usize,
    pub note_index: usize,
    pub note: Note,
}

/// Read-only song model consumed by the judge.
///
/// Deserialization goes through [`Song::new`], so a loaded song is held to
/// the same rules as a constructed one.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawSong")
)]
pub struct Song {
    bpm: f32,
    gap_ms: f64,
    sentences: Vec<Sentence>,
}

#[cfg(feature = "serialization")]
#[derive(serde::Deserialize)]
struct RawSong {
    bpm: f32,
    gap_ms: f64,
    sentences: Vec<Sentence>,
}

#[cfg(feature = "serialization")]
impl TryFrom<RawSong> for Song {
    type Error = Error;

    fn try_from(raw: RawSong) -> Result<Self> {
        Song::new(raw.bpm, raw.gap_ms, raw.sentences)
    }
}

impl Song {
    /// Sentences must be sorted and must not overlap each other.
    pub fn new(bpm: f32, gap_ms: f64, sentences: Vec<Sentence>) -> Result<Self> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(Error::InvalidTempo(bpm));
        }
        if !gap_ms.is_finite() {
            return Err(Error::InvalidSong(format!("gap {} ms is not finite", gap_ms)));
        }
        for pair in sentences.windows(2) {
            if pair[1].min_beat() < pair[0].max_beat() {
                return Err(Error::InvalidSong(format!(
                    "sentence starting at beat {} overlaps sentence ending at beat {}",
                    pair[1].min_beat(),
                    pair[0].max_beat()
                )));
            }
        }
        Ok(Self {
            bpm,
            gap_ms,
            sentences,
        })
    }

    #[inline]
    pub fn bpm(&self) -> f32 {
        self.bpm
    }

    #[inline]
    pub fn gap_ms(&self) -> f64 {
        self.gap_ms
    }

    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    #[inline]
    pub fn millis_per_beat(&self) -> f64 {
        60_000.0 / self.bpm as f64
    }

    /// Playback position (ms) at which `beat` starts.
    #[inline]
    pub fn beat_to_millis(&self, beat: f64) -> f64 {
        self.gap_ms + beat * self.millis_per_beat()
    }

    /// Fractional beat at playback position `millis`.
    #[inline]
    pub fn millis_to_beat(&self, millis: f64) -> f64 {
        (millis - self.gap_ms) / self.millis_per_beat()
    }

    /// Beat in progress at playback position `millis`.
    #[inline]
    pub fn current_beat(&self, millis: f64) -> i32 {
        self.millis_to_beat(millis).floor() as i32
    }

    /// Index of the sentence whose beat range contains `beat`.
    pub fn sentence_at_beat(&self, beat: i32) -> Option<usize> {
        let idx = self.sentences.partition_point(|s| s.min_beat() <= beat);
        if idx == 0 {
            return None;
        }
        self.sentences[idx - 1]
            .contains_beat(beat)
            .then_some(idx - 1)
    }

    /// Note overlapping `beat`, if any.
    pub fn note_at_beat(&self, beat: i32) -> Option<NoteLocation> {
        let sentence_index = self.sentence_at_beat(beat)?;
        let (note_index, note) = self.sentences[sentence_index].note_at_beat(beat)?;
        Some(NoteLocation {
            sentence_index,
            note_index,
            note: *note,
        })
    }

    /// Summed beat length of scorable non-golden notes.
    pub fn normal_length(&self) -> i64 {
        self.scorable_notes()
            .filter(|n| !n.kind.is_golden())
            .map(|n| n.length() as i64)
            .sum()
    }

    /// Summed beat length of golden notes.
    pub fn golden_length(&self) -> i64 {
        self.scorable_notes()
            .filter(|n| n.kind.is_golden())
            .map(|n| n.length() as i64)
            .sum()
    }

    /// Sentences that can be rated (contain at least one scorable note).
    pub fn scorable_sentence_count(&self) -> usize {
        self.sentences
            .iter()
            .filter(|s| s.scorable_length() > 0)
            .count()
    }

    fn scorable_notes(&self) -> impl Iterator<Item = &Note> {
        self.sentences
            .iter()
            .flat_map(|s| s.notes().iter())
            .filter(|n| n.kind.is_scorable())
    }
}
