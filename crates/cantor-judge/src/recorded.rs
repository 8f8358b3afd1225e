//! Sung notes reconstructed from judged beats.

use cantor_core::Note;
use tracing::trace;

/// A run of consecutive beats sung on the same rounded pitch.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct RecordedNote {
    /// Semitone detected on the first beat.
    pub raw_semitone: i32,
    pub rounded_semitone: i32,
    pub start_beat: i32,
    /// Exclusive.
    pub end_beat: i32,
    pub target: Option<Note>,
}

impl RecordedNote {
    pub fn length(&self) -> i32 {
        self.end_beat - self.start_beat
    }
}

/// Recorded notes of the sentence being judged.
#[derive(Debug, Clone, Default)]
pub struct RecordedNotes {
    notes: Vec<RecordedNote>,
    /// The last note may still be extended.
    open: bool,
}

impl RecordedNotes {
    /// Feed one judged beat. `None` means silence.
    pub fn record(&mut self, beat: i32, raw: Option<i32>, rounded: Option<i32>, target: Option<Note>) {
        let (Some(raw), Some(rounded)) = (raw, rounded) else {
            self.open = false;
            return;
        };

        if self.open {
            if let Some(last) = self.notes.last_mut() {
                if last.end_beat == beat && last.rounded_semitone == rounded && last.target == target {
                    last.end_beat = beat + 1;
                    return;
                }
            }
        }

        trace!(beat, rounded, "recorded note started");
        self.notes.push(RecordedNote {
            raw_semitone: raw,
            rounded_semitone: rounded,
            start_beat: beat,
            end_beat: beat + 1,
            target,
        });
        self.open = true;
    }

    pub fn notes(&self) -> &[RecordedNote] {
        &self.notes
    }

    /// Hand over the finished list and start empty.
    pub fn take(&mut self) -> Vec<RecordedNote> {
        self.open = false;
        std::mem::take(&mut self.notes)
    }

    pub fn clear(&mut self) {
        self.notes.clear();
        self.open = false;
    }
}
