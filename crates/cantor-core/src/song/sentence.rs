//! Lyric lines: ordered, non-overlapping groups of notes.

use super::Note;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawSentence")
)]
pub struct Sentence {
    notes: Vec<Note>,
    line_break_beat: i32,
}

#[cfg(feature = "serialization")]
#[derive(serde::Deserialize)]
struct RawSentence {
    notes: Vec<Note>,
    line_break_beat: i32,
}

#[cfg(feature = "serialization")]
impl TryFrom<RawSentence> for Sentence {
    type Error = Error;

    fn try_from(raw: RawSentence) -> Result<Self> {
        Sentence::new(raw.notes, raw.line_break_beat)
    }
}

impl Sentence {
    /// Notes must be sorted by start beat and must not overlap.
    pub fn new(notes: Vec<Note>, line_break_beat: i32) -> Result<Self> {
        if notes.is_empty() {
            return Err(Error::InvalidSong("sentence without notes".into()));
        }
        for pair in notes.windows(2) {
            if pair[1].start_beat < pair[0].end_beat {
                return Err(Error::InvalidSong(format!(
                    "note at beat {} overlaps note ending at beat {}",
                    pair[1].start_beat, pair[0].end_beat
                )));
            }
        }
        Ok(Self {
            notes,
            line_break_beat,
        })
    }

    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Beat at which the display wraps to the next line.
    pub fn line_break_beat(&self) -> i32 {
        self.line_break_beat
    }

    /// First beat of the first note.
    pub fn min_beat(&self) -> i32 {
        self.notes[0].start_beat
    }

    /// Exclusive end beat of the last note.
    pub fn max_beat(&self) -> i32 {
        self.notes[self.notes.len() - 1].end_beat
    }

    pub fn contains_beat(&self, beat: i32) -> bool {
        beat >= self.min_beat() && beat < self.max_beat()
    }

    /// Note overlapping `beat`, with its index in the sentence.
    pub fn note_at_beat(&self, beat: i32) -> Option<(usize, &Note)> {
        // Notes are sorted and disjoint: the candidate is the last one
        // starting at or before `beat`.
        let idx = self.notes.partition_point(|n| n.start_beat <= beat);
        if idx == 0 {
            return None;
        }
        let note = &self.notes[idx - 1];
        note.contains_beat(beat).then_some((idx - 1, note))
    }

    /// First note starting at or after `beat`.
    pub fn next_note_from(&self, beat: i32) -> Option<(usize, &Note)> {
        let idx = self.notes.partition_point(|n| n.start_beat < beat);
        self.notes.get(idx).map(|n| (idx, n))
    }

    /// Total beat length of notes that count toward the score.
    pub fn scorable_length(&self) -> i32 {
        self.notes
            .iter()
            .filter(|n| n.kind.is_scorable())
            .map(Note::length)
            .sum()
    }
}
