//! Target notes of a song.

use crate::{Error, Result};

/// How a note is judged and weighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum NoteKind {
    #[default]
    Normal,
    /// Counts double toward the score.
    Golden,
    /// Any pitch is accepted; never scored.
    Freestyle,
    /// Any pitch is accepted.
    Rap,
    /// Any pitch is accepted; counts double.
    RapGolden,
}

impl NoteKind {
    #[inline]
    pub fn is_golden(self) -> bool {
        matches!(self, NoteKind::Golden | NoteKind::RapGolden)
    }

    /// Whether any detected pitch is judged correct on this note.
    #[inline]
    pub fn accepts_any_pitch(self) -> bool {
        matches!(self, NoteKind::Freestyle | NoteKind::Rap | NoteKind::RapGolden)
    }

    /// Whether sung beats on this note contribute to the score.
    #[inline]
    pub fn is_scorable(self) -> bool {
        !matches!(self, NoteKind::Freestyle)
    }
}

/// A target note spanning `[start_beat, end_beat)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "RawNote")
)]
pub struct Note {
    pub start_beat: i32,
    /// Exclusive.
    pub end_beat: i32,
    pub semitone: i32,
    pub kind: NoteKind,
}

/// Unvalidated wire form of a [`Note`].
#[cfg(feature = "serialization")]
#[derive(serde::Deserialize)]
struct RawNote {
    start_beat: i32,
    end_beat: i32,
    semitone: i32,
    kind: NoteKind,
}

#[cfg(feature = "serialization")]
impl TryFrom<RawNote> for Note {
    type Error = Error;

    fn try_from(raw: RawNote) -> Result<Self> {
        Note::new(raw.start_beat, raw.end_beat, raw.semitone, raw.kind)
    }
}

impl Note {
    pub fn new(start_beat: i32, end_beat: i32, semitone: i32, kind: NoteKind) -> Result<Self> {
        if end_beat <= start_beat {
            return Err(Error::InvalidNoteRange {
                start: start_beat,
                end: end_beat,
            });
        }
        Ok(Self {
            start_beat,
            end_beat,
            semitone,
            kind,
        })
    }

    /// Length in beats.
    #[inline]
    pub fn length(&self) -> i32 {
        self.end_beat - self.start_beat
    }

    #[inline]
    pub fn contains_beat(&self, beat: i32) -> bool {
        beat >= self.start_beat && beat < self.end_beat
    }

    /// Last beat that belongs to the note.
    #[inline]
    pub fn last_beat(&self) -> i32 {
        self.end_beat - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_kind_flags() {
        assert!(NoteKind::Golden.is_golden());
        assert!(NoteKind::RapGolden.is_golden());
        assert!(!NoteKind::Rap.is_golden());
        assert!(NoteKind::Freestyle.accepts_any_pitch());
        assert!(!NoteKind::Normal.accepts_any_pitch());
        assert!(!NoteKind::Freestyle.is_scorable());
        assert!(NoteKind::Rap.is_scorable());
    }

    #[test]
    fn test_note_range() {
        let note = Note::new(4, 8, 60, NoteKind::Normal).unwrap();
        assert_eq!(note.length(), 4);
        assert!(note.contains_beat(4));
        assert!(note.contains_beat(7));
        assert!(!note.contains_beat(8));
        assert_eq!(note.last_beat(), 7);
    }

    #[test]
    fn test_empty_note_rejected() {
        assert!(matches!(
            Note::new(4, 4, 60, NoteKind::Normal),
            Err(Error::InvalidNoteRange { start: 4, end: 4 })
        ));
    }
}
