//! Judge event types and their fan-out channels.

use cantor_core::Note;
use crossbeam_channel::{Receiver, Sender};

use crate::recorded::RecordedNote;

/// One judged beat.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct BeatAnalyzed {
    pub beat: i32,
    /// Semitone as detected; `None` when no pitch was found.
    pub raw_semitone: Option<i32>,
    /// Semitone after tolerance rounding and joker override.
    pub rounded_semitone: Option<i32>,
    pub frequency_hz: Option<f32>,
    pub joker_used: bool,
    pub sentence_index: usize,
    pub note_index: Option<usize>,
    /// Target note overlapping the beat.
    pub note: Option<Note>,
}

/// A note's last beat has passed.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct NoteAnalyzed {
    pub sentence_index: usize,
    pub note_index: usize,
    pub note: Note,
}

/// A sentence's last beat has passed.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct SentenceAnalyzed {
    pub sentence_index: usize,
    pub recorded_notes: Vec<RecordedNote>,
}

/// All judge events in emission order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum JudgeEvent {
    Beat(BeatAnalyzed),
    Note(NoteAnalyzed),
    Sentence(SentenceAnalyzed),
}

/// Fan-out over unbounded crossbeam channels.
///
/// Subscribers whose receiver was dropped are pruned on the next emit.
#[derive(Debug)]
pub struct Broadcaster<T> {
    subscribers: Vec<Sender<T>>,
}

impl<T: Clone> Broadcaster<T> {
    pub fn new() -> Self {
        Self {
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self) -> Receiver<T> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.subscribers.push(tx);
        rx
    }

    pub fn emit(&mut self, event: &T) {
        self.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

impl<T: Clone> Default for Broadcaster<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The scheduler's four output streams.
#[derive(Debug, Default)]
pub(crate) struct JudgeChannels {
    pub beats: Broadcaster<BeatAnalyzed>,
    pub notes: Broadcaster<NoteAnalyzed>,
    pub sentences: Broadcaster<SentenceAnalyzed>,
    pub all: Broadcaster<JudgeEvent>,
}

impl JudgeChannels {
    pub fn beat(&mut self, event: BeatAnalyzed) {
        self.beats.emit(&event);
        self.all.emit(&JudgeEvent::Beat(event));
    }

    pub fn note(&mut self, event: NoteAnalyzed) {
        self.notes.emit(&event);
        self.all.emit(&JudgeEvent::Note(event));
    }

    pub fn sentence(&mut self, event: SentenceAnalyzed) {
        self.sentences.emit(&event);
        self.all.emit(&JudgeEvent::Sentence(event));
    }
}
