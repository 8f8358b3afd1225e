//! Running score for one player.
//!
//! The score has three components:
//!
//! - **Normal** - correctly sung beats of normal (and rap) notes
//! - **Golden** - correctly sung beats of golden notes, worth twice as much
//! - **Sentence bonus** - a share of the bonus budget per perfect sentence
//!
//! The note budget (`max_score - max_bonus_score`) is split between normal
//! and golden notes in proportion to their beat lengths, golden beats
//! weighted double. Both maxima are rounded up and any overhang is taken back
//! from the normal maximum so they sum to the budget exactly.

use std::sync::Arc;

use arc_swap::ArcSwap;
use cantor_core::{Note, Song};
use crossbeam_channel::Receiver;
use tracing::{debug, info, warn};

use crate::events::{BeatAnalyzed, Broadcaster, JudgeEvent, NoteAnalyzed, SentenceAnalyzed};
use crate::rating::{default_tiers, rate, RatingTier, SentenceRating};
use crate::rounding::is_correct;
use crate::{Error, Result};

/// Score limits and rating table.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ScoreConfig {
    pub max_score: u32,
    pub max_bonus_score: u32,
    /// Correct fraction at which a sentence counts as perfect.
    pub perfect_sentence_threshold: f64,
    /// Bonus is shared between at most this many sentences.
    pub bonus_sentence_cap: usize,
    pub rating_tiers: Vec<RatingTier>,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            max_score: 10_000,
            max_bonus_score: 1_000,
            perfect_sentence_threshold: 0.95,
            bonus_sentence_cap: 20,
            rating_tiers: default_tiers(),
        }
    }
}

impl ScoreConfig {
    /// Budget shared by normal and golden notes.
    pub fn note_budget(&self) -> u32 {
        self.max_score.saturating_sub(self.max_bonus_score)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_bonus_score > self.max_score {
            return Err(Error::InvalidScoreConfig(format!(
                "bonus {} exceeds max score {}",
                self.max_bonus_score, self.max_score
            )));
        }
        if !(0.0..=1.0).contains(&self.perfect_sentence_threshold) {
            return Err(Error::InvalidScoreConfig(format!(
                "perfect threshold {} outside [0, 1]",
                self.perfect_sentence_threshold
            )));
        }
        if self.bonus_sentence_cap == 0 {
            return Err(Error::InvalidScoreConfig(
                "bonus sentence cap must be at least 1".into(),
            ));
        }
        if self.rating_tiers.is_empty() {
            return Err(Error::InvalidScoreConfig("empty rating table".into()));
        }
        if let Some(tier) = self
            .rating_tiers
            .iter()
            .find(|t| !(0.0..=1.0).contains(&t.min_fraction))
        {
            return Err(Error::InvalidScoreConfig(format!(
                "{} threshold {} outside [0, 1]",
                tier.rating, tier.min_fraction
            )));
        }
        Ok(())
    }
}

/// Maximum normal/golden contributions for a song.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoreBudget {
    pub normal_max: u32,
    pub golden_max: u32,
    pub normal_length: i64,
    pub golden_length: i64,
}

impl ScoreBudget {
    pub fn new(budget: u32, normal_length: i64, golden_length: i64) -> Self {
        let weighted = normal_length + 2 * golden_length;
        if weighted <= 0 {
            return Self {
                normal_max: 0,
                golden_max: 0,
                normal_length,
                golden_length,
            };
        }

        let per_normal_beat = budget as f64 / weighted as f64;
        let mut normal_max = (per_normal_beat * normal_length as f64).ceil() as u32;
        let mut golden_max = (2.0 * per_normal_beat * golden_length as f64).ceil() as u32;

        let overhang = (u64::from(normal_max) + u64::from(golden_max))
            .saturating_sub(u64::from(budget))
            .min(u64::from(u32::MAX)) as u32;
        if overhang > normal_max {
            warn!(
                overhang,
                normal_max, "score rounding overhang exceeds the normal budget"
            );
            golden_max -= overhang - normal_max;
            normal_max = 0;
        } else {
            normal_max -= overhang;
        }

        if u64::from(normal_max) + u64::from(golden_max) != u64::from(budget) {
            warn!(
                normal_max,
                golden_max, budget, "note score maxima do not sum to the budget"
            );
        }

        Self {
            normal_max,
            golden_max,
            normal_length,
            golden_length,
        }
    }

    pub fn for_song(song: &Song, config: &ScoreConfig) -> Self {
        Self::new(config.note_budget(), song.normal_length(), song.golden_length())
    }

    pub fn normal_score(&self, correct_length: i64) -> u32 {
        Self::share(self.normal_max, correct_length, self.normal_length)
    }

    pub fn golden_score(&self, correct_length: i64) -> u32 {
        Self::share(self.golden_max, correct_length, self.golden_length)
    }

    fn share(max: u32, correct: i64, total: i64) -> u32 {
        if total <= 0 {
            return 0;
        }
        (max as i64 * correct.clamp(0, total) / total) as u32
    }
}

/// Bonus for `perfect` perfect sentences out of `scorable` rated ones.
pub fn sentence_bonus(max_bonus: u32, perfect: usize, scorable: usize, cap: usize) -> u32 {
    let divisor = scorable.min(cap) as u64;
    if divisor == 0 {
        return 0;
    }
    let bonus = (max_bonus as u64 * perfect as u64).div_ceil(divisor);
    bonus.min(max_bonus as u64) as u32
}

/// A note sung correctly over its whole length.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct NoteScore {
    pub sentence_index: usize,
    pub note_index: usize,
    pub note: Note,
    pub correct_beats: i32,
}

/// Rating of a finished sentence.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct SentenceScore {
    pub sentence_index: usize,
    pub correct_fraction: f64,
    pub rating: SentenceRating,
    pub perfect: bool,
    pub normal_correct: i32,
    pub golden_correct: i32,
}

/// Point-in-time score readout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct ScoreSnapshot {
    pub normal: u32,
    pub golden: u32,
    pub bonus: u32,
    pub total: u32,
    pub perfect_sentences: usize,
    pub rated_sentences: usize,
}

/// Lock-free handle to the latest [`ScoreSnapshot`], readable from any thread.
#[derive(Debug, Clone)]
pub struct ScoreReadout(Arc<ArcSwap<ScoreSnapshot>>);

impl ScoreReadout {
    fn new() -> Self {
        Self(Arc::new(ArcSwap::from_pointee(ScoreSnapshot::default())))
    }

    pub fn load(&self) -> ScoreSnapshot {
        **self.0.load()
    }

    fn publish(&self, snapshot: ScoreSnapshot) {
        self.0.store(Arc::new(snapshot));
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct SentenceTally {
    normal: i32,
    golden: i32,
}

/// Scores the judge events of one player.
#[derive(Debug)]
pub struct ScoreEngine {
    song: Arc<Song>,
    config: ScoreConfig,
    budget: ScoreBudget,
    scorable_sentences: usize,

    note_correct: Vec<Vec<i32>>,
    sentence_correct: Vec<SentenceTally>,
    correct_normal: i64,
    correct_golden: i64,
    perfect_sentences: usize,
    rated_sentences: usize,
    last_scored_beat: Option<i32>,

    note_scores: Broadcaster<NoteScore>,
    sentence_scores: Broadcaster<SentenceScore>,
    readout: ScoreReadout,
}

impl ScoreEngine {
    pub fn new(song: Arc<Song>, config: ScoreConfig) -> Result<Self> {
        config.validate()?;
        let budget = ScoreBudget::for_song(&song, &config);
        debug!(
            normal_max = budget.normal_max,
            golden_max = budget.golden_max,
            "score budget"
        );

        let note_correct = song
            .sentences()
            .iter()
            .map(|s| vec![0; s.notes().len()])
            .collect();
        let sentence_correct = vec![SentenceTally::default(); song.sentences().len()];

        Ok(Self {
            scorable_sentences: song.scorable_sentence_count(),
            song,
            config,
            budget,
            note_correct,
            sentence_correct,
            correct_normal: 0,
            correct_golden: 0,
            perfect_sentences: 0,
            rated_sentences: 0,
            last_scored_beat: None,
            note_scores: Broadcaster::new(),
            sentence_scores: Broadcaster::new(),
            readout: ScoreReadout::new(),
        })
    }

    pub fn config(&self) -> &ScoreConfig {
        &self.config
    }

    pub fn budget(&self) -> &ScoreBudget {
        &self.budget
    }

    pub fn subscribe_note_scores(&mut self) -> Receiver<NoteScore> {
        self.note_scores.subscribe()
    }

    pub fn subscribe_sentence_scores(&mut self) -> Receiver<SentenceScore> {
        self.sentence_scores.subscribe()
    }

    /// Shared handle to the latest snapshot.
    pub fn readout(&self) -> ScoreReadout {
        self.readout.clone()
    }

    /// Apply every event waiting on `events`. Returns how many were applied.
    pub fn consume(&mut self, events: &Receiver<JudgeEvent>) -> usize {
        let mut count = 0;
        for event in events.try_iter() {
            self.handle(&event);
            count += 1;
        }
        count
    }

    pub fn handle(&mut self, event: &JudgeEvent) {
        match event {
            JudgeEvent::Beat(beat) => self.on_beat(beat),
            JudgeEvent::Note(note) => self.on_note(note),
            JudgeEvent::Sentence(sentence) => self.on_sentence(sentence),
        }
        self.readout.publish(self.snapshot());
    }

    fn on_beat(&mut self, event: &BeatAnalyzed) {
        let (Some(note), Some(note_index), Some(rounded)) =
            (event.note, event.note_index, event.rounded_semitone)
        else {
            return;
        };
        if !note.kind.is_scorable() || !is_correct(rounded, note.semitone) {
            return;
        }
        if self.last_scored_beat.is_some_and(|last| event.beat <= last) {
            return;
        }

        let Some(counter) = self
            .note_correct
            .get_mut(event.sentence_index)
            .and_then(|notes| notes.get_mut(note_index))
        else {
            return;
        };
        if *counter >= note.length() {
            return;
        }
        *counter += 1;
        self.last_scored_beat = Some(event.beat);

        let tally = &mut self.sentence_correct[event.sentence_index];
        if note.kind.is_golden() {
            tally.golden += 1;
            self.correct_golden += 1;
        } else {
            tally.normal += 1;
            self.correct_normal += 1;
        }
    }

    fn on_note(&mut self, event: &NoteAnalyzed) {
        if !event.note.kind.is_scorable() {
            return;
        }
        let correct_beats = self
            .note_correct
            .get(event.sentence_index)
            .and_then(|notes| notes.get(event.note_index))
            .copied()
            .unwrap_or(0);
        if correct_beats >= event.note.length() {
            self.note_scores.emit(&NoteScore {
                sentence_index: event.sentence_index,
                note_index: event.note_index,
                note: event.note,
                correct_beats,
            });
        }
    }

    fn on_sentence(&mut self, event: &SentenceAnalyzed) {
        let Some(sentence) = self.song.sentences().get(event.sentence_index) else {
            return;
        };
        let scorable = sentence.scorable_length();
        if scorable <= 0 {
            debug!(sentence = event.sentence_index, "sentence without scorable notes");
            return;
        }

        let tally = self.sentence_correct[event.sentence_index];
        let correct_fraction = (tally.normal + tally.golden) as f64 / scorable as f64;
        let perfect = correct_fraction >= self.config.perfect_sentence_threshold;
        if perfect {
            self.perfect_sentences += 1;
        }
        self.rated_sentences += 1;

        let rating = rate(correct_fraction, &self.config.rating_tiers);
        info!(
            sentence = event.sentence_index,
            correct_fraction, %rating, "sentence rated"
        );
        self.sentence_scores.emit(&SentenceScore {
            sentence_index: event.sentence_index,
            correct_fraction,
            rating,
            perfect,
            normal_correct: tally.normal,
            golden_correct: tally.golden,
        });
    }

    pub fn normal_score(&self) -> u32 {
        self.budget.normal_score(self.correct_normal)
    }

    pub fn golden_score(&self) -> u32 {
        self.budget.golden_score(self.correct_golden)
    }

    pub fn sentence_bonus(&self) -> u32 {
        sentence_bonus(
            self.config.max_bonus_score,
            self.perfect_sentences,
            self.scorable_sentences,
            self.config.bonus_sentence_cap,
        )
    }

    pub fn total(&self) -> u32 {
        self.normal_score() + self.golden_score() + self.sentence_bonus()
    }

    pub fn snapshot(&self) -> ScoreSnapshot {
        let normal = self.normal_score();
        let golden = self.golden_score();
        let bonus = self.sentence_bonus();
        ScoreSnapshot {
            normal,
            golden,
            bonus,
            total: normal + golden + bonus,
            perfect_sentences: self.perfect_sentences,
            rated_sentences: self.rated_sentences,
        }
    }
}
