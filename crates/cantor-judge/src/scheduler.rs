//! Beat-synchronized analysis scheduler.
//!
//! Drives judging for one player. Each tick it either analyzes the captured
//! beats whose samples are complete (local input) or merges pitch events
//! reported by a remote device (remote input). Every judged beat goes
//! through the same rounding and joker logic and produces events in a fixed
//! order: `BeatAnalyzed`, then any `NoteAnalyzed`, then `SentenceAnalyzed`.
//!
//! ## States
//!
//! ```text
//! Idle -> WaitingForSamples -> Analyzing -> AdvancingBeat -> WaitingForSamples ...
//!                                                         -> Finished
//! any  -> Disabled (capture device gone)
//! any  -> Idle     (cancel)
//! ```

use std::sync::Arc;

use cantor_core::{
    AudioRingBuffer, DeviceConfig, JudgeConfig, Note, PitchRange, RemotePitchConsumer,
    RemotePitchEvent, Song,
};
use cantor_pitch::PitchDetector;
use crossbeam_channel::Receiver;
use tracing::{debug, info, warn};

use crate::events::{BeatAnalyzed, JudgeChannels, JudgeEvent, NoteAnalyzed, SentenceAnalyzed};
use crate::mapper::BeatSampleMapper;
use crate::recorded::{RecordedNote, RecordedNotes};
use crate::rounding::{is_correct, round_to_target, Joker};
use crate::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Not started yet, or cancelled.
    Idle,
    WaitingForSamples,
    Analyzing,
    AdvancingBeat,
    /// Every sentence has been analyzed.
    Finished,
    /// Judging is off for this player.
    Disabled,
}

/// Where detected pitches come from.
enum PitchInput {
    Local {
        detector: PitchDetector,
        mapper: BeatSampleMapper,
        window: Vec<f32>,
    },
    Remote {
        consumer: RemotePitchConsumer,
        last_accepted_beat: Option<i32>,
    },
}

/// Tracks whether the capture device is still delivering samples.
#[derive(Debug, Default)]
struct CaptureWatch {
    total_written: u64,
    last_progress_ms: Option<f64>,
}

impl CaptureWatch {
    /// Milliseconds of playback since the buffer last advanced.
    fn stalled_for(&mut self, buffer: &AudioRingBuffer, position_ms: f64) -> f64 {
        let written = buffer.total_written();
        if written != self.total_written || self.last_progress_ms.is_none() {
            self.total_written = written;
            self.last_progress_ms = Some(position_ms);
            return 0.0;
        }
        self.last_progress_ms
            .map_or(0.0, |since| (position_ms - since).max(0.0))
    }
}

/// Per-player judging state machine.
pub struct AnalysisScheduler {
    song: Arc<Song>,
    config: JudgeConfig,
    range: PitchRange,
    input: PitchInput,
    state: SchedulerState,
    cancelled: bool,

    /// Sentence being judged.
    sentence: Option<usize>,
    next_sentence: usize,
    /// Next beat to analyze.
    beat: i32,
    /// Index of the first note of the current sentence not yet reported.
    next_note: usize,

    joker: Joker,
    recorded: RecordedNotes,
    capture: CaptureWatch,
    channels: JudgeChannels,
}

impl AnalysisScheduler {
    /// Scheduler judging microphone input captured into an [`AudioRingBuffer`].
    pub fn local(
        song: Arc<Song>,
        device: &DeviceConfig,
        config: JudgeConfig,
        range: PitchRange,
    ) -> Result<Self> {
        config.validate()?;
        let detector = PitchDetector::from_config(device, range)?;
        let input = PitchInput::Local {
            detector,
            mapper: BeatSampleMapper::from_config(device),
            window: Vec::with_capacity(config.max_analysis_samples),
        };
        Ok(Self::with_input(song, config, range, input))
    }

    /// Scheduler judging pitch events reported by a remote device.
    pub fn remote(
        song: Arc<Song>,
        consumer: RemotePitchConsumer,
        config: JudgeConfig,
        range: PitchRange,
    ) -> Result<Self> {
        config.validate()?;
        range.validate()?;
        let input = PitchInput::Remote {
            consumer,
            last_accepted_beat: None,
        };
        Ok(Self::with_input(song, config, range, input))
    }

    fn with_input(song: Arc<Song>, config: JudgeConfig, range: PitchRange, input: PitchInput) -> Self {
        Self {
            song,
            config,
            range,
            input,
            state: SchedulerState::Idle,
            cancelled: false,
            sentence: None,
            next_sentence: 0,
            beat: 0,
            next_note: 0,
            joker: Joker::default(),
            recorded: RecordedNotes::default(),
            capture: CaptureWatch::default(),
            channels: JudgeChannels::default(),
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_remote(&self) -> bool {
        matches!(self.input, PitchInput::Remote { .. })
    }

    pub fn song(&self) -> &Arc<Song> {
        &self.song
    }

    pub fn config(&self) -> &JudgeConfig {
        &self.config
    }

    /// Sentence currently being judged.
    pub fn current_sentence(&self) -> Option<usize> {
        self.sentence
    }

    /// Next beat to be analyzed.
    pub fn current_beat(&self) -> i32 {
        self.beat
    }

    pub fn used_joker_count(&self) -> u32 {
        self.joker.used_count()
    }

    pub fn has_joker(&self) -> bool {
        self.joker.is_available()
    }

    /// Recorded notes of the sentence being judged.
    pub fn recorded_notes(&self) -> &[RecordedNote] {
        self.recorded.notes()
    }

    pub fn subscribe(&mut self) -> Receiver<JudgeEvent> {
        self.channels.all.subscribe()
    }

    pub fn subscribe_beats(&mut self) -> Receiver<BeatAnalyzed> {
        self.channels.beats.subscribe()
    }

    pub fn subscribe_notes(&mut self) -> Receiver<NoteAnalyzed> {
        self.channels.notes.subscribe()
    }

    pub fn subscribe_sentences(&mut self) -> Receiver<SentenceAnalyzed> {
        self.channels.sentences.subscribe()
    }

    /// Advance local judging to `position_ms`, reading captured samples from
    /// `buffer`. Analyzes every beat whose samples are complete.
    pub fn tick(&mut self, position_ms: f64, buffer: &AudioRingBuffer) {
        if !self.is_running() {
            return;
        }
        if !matches!(self.input, PitchInput::Local { .. }) {
            debug!("tick with a capture buffer on a remote scheduler");
            return;
        }

        let stalled_ms = self.capture.stalled_for(buffer, position_ms);
        if stalled_ms > self.config.stale_capture_ms {
            self.disable(&format!("no samples captured for {stalled_ms:.0} ms"));
            return;
        }

        loop {
            let Some(sentence_index) = self.ensure_sentence() else {
                return;
            };
            let max_beat = self.song.sentences()[sentence_index].max_beat();
            if self.beat >= max_beat {
                self.advance_to(max_beat);
                continue;
            }

            let PitchInput::Local {
                detector,
                mapper,
                window,
            } = &mut self.input
            else {
                return;
            };

            if !mapper.is_beat_captured(&self.song, self.beat, position_ms) {
                self.state = SchedulerState::WaitingForSamples;
                return;
            }

            self.state = SchedulerState::Analyzing;
            let beat_window = mapper.beat_window(&self.song, self.beat, position_ms, buffer.len());
            buffer
                .read(beat_window.newest(self.config.max_analysis_samples))
                .copy_into(window);
            let pitch = detector.detect(window);
            if pitch.is_none() {
                detector.reset();
            }

            let beat = self.beat;
            self.judge_beat(
                beat,
                pitch.map(|p| p.semitone),
                pitch.and_then(|p| p.frequency_hz),
            );

            self.state = SchedulerState::AdvancingBeat;
            let next = self.next_beat_to_analyze(sentence_index, beat + 1);
            self.advance_to(next);
        }
    }

    /// Merge remote pitch events up to `position_ms`.
    ///
    /// Events are drained before anything else happens. An event is accepted
    /// only when its beat is not before the last accepted remote beat and
    /// not after the current song beat; others are dropped with a warning.
    /// Afterwards every note and sentence ending at or before the current
    /// song beat is reported, whether or not events arrived for it.
    pub fn tick_remote(&mut self, position_ms: f64) {
        if !self.is_running() {
            return;
        }
        let PitchInput::Remote { consumer, .. } = &mut self.input else {
            debug!("remote tick on a local scheduler");
            return;
        };
        let events: Vec<RemotePitchEvent> = consumer.drain().collect();

        if self.state == SchedulerState::Idle {
            self.state = SchedulerState::WaitingForSamples;
        }

        let song_beat = self.song.current_beat(position_ms);
        for event in events {
            if self.accept_remote(&event, song_beat) {
                self.judge_remote(event);
            }
            if !self.is_running() {
                return;
            }
        }
        self.advance_to(song_beat);
    }

    fn accept_remote(&mut self, event: &RemotePitchEvent, song_beat: i32) -> bool {
        let PitchInput::Remote {
            last_accepted_beat, ..
        } = &mut self.input
        else {
            return false;
        };

        if let Some(last) = *last_accepted_beat {
            if event.beat < last {
                warn!(beat = event.beat, last, "dropping late remote pitch event");
                return false;
            }
        }
        if event.beat > song_beat {
            warn!(
                beat = event.beat,
                song_beat, "dropping remote pitch event from the future"
            );
            return false;
        }

        *last_accepted_beat = Some(event.beat);
        debug!(beat = event.beat, semitone = event.semitone, "remote pitch event accepted");
        true
    }

    fn judge_remote(&mut self, event: RemotePitchEvent) {
        // Close everything the event has moved past.
        self.advance_to(event.beat);
        let Some(sentence_index) = self.ensure_sentence() else {
            return;
        };
        let sentence = &self.song.sentences()[sentence_index];
        if !sentence.contains_beat(event.beat) {
            debug!(beat = event.beat, "remote pitch event between sentences");
            return;
        }
        if let Some((note_index, _)) = sentence.note_at_beat(event.beat) {
            if note_index < self.next_note {
                warn!(
                    beat = event.beat,
                    note_index, "dropping remote pitch event for an analyzed note"
                );
                return;
            }
        }

        self.state = SchedulerState::Analyzing;
        let frequency = (event.frequency_hz > 0.0).then_some(event.frequency_hz);
        self.judge_beat(event.beat, Some(event.semitone), frequency);
        self.state = SchedulerState::AdvancingBeat;
        self.advance_to(event.beat + 1);
        if self.is_running() {
            self.state = SchedulerState::WaitingForSamples;
        }
    }

    /// Report every note and sentence not yet analyzed, ending the song.
    pub fn finish(&mut self) {
        if !self.is_running() {
            return;
        }
        self.advance_to(i32::MAX);
        self.ensure_sentence();
    }

    /// Stop judging without emitting further events.
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.recorded.clear();
        self.sentence = None;
        self.state = SchedulerState::Idle;
        debug!("analysis scheduler cancelled");
    }

    /// Turn judging off for this player (e.g. capture device lost).
    pub fn disable(&mut self, reason: &str) {
        warn!(reason, "judging disabled");
        self.recorded.clear();
        self.sentence = None;
        self.state = SchedulerState::Disabled;
    }

    fn is_running(&self) -> bool {
        !self.cancelled && !matches!(self.state, SchedulerState::Finished | SchedulerState::Disabled)
    }

    /// Current sentence, selecting the next unjudged one when needed.
    fn ensure_sentence(&mut self) -> Option<usize> {
        if self.sentence.is_some() {
            return self.sentence;
        }
        let Some(sentence) = self.song.sentences().get(self.next_sentence) else {
            if self.state != SchedulerState::Finished {
                info!("all sentences analyzed");
            }
            self.state = SchedulerState::Finished;
            return None;
        };

        self.beat = self.beat.max(sentence.min_beat());
        self.sentence = Some(self.next_sentence);
        self.next_note = 0;
        self.recorded.clear();
        Some(self.next_sentence)
    }

    /// The beat to analyze after `beat - 1`, skipping gaps between notes
    /// unless those beats are analyzed too.
    fn next_beat_to_analyze(&self, sentence_index: usize, beat: i32) -> i32 {
        let sentence = &self.song.sentences()[sentence_index];
        if self.config.analyze_beats_without_target || sentence.note_at_beat(beat).is_some() {
            return beat;
        }
        sentence
            .next_note_from(beat)
            .map_or(sentence.max_beat(), |(_, note)| note.start_beat)
    }

    /// Move the cursor to `beat`, reporting notes and sentences that end at
    /// or before it.
    fn advance_to(&mut self, beat: i32) {
        while let Some(sentence_index) = self.ensure_sentence() {
            let song = Arc::clone(&self.song);
            let sentence = &song.sentences()[sentence_index];

            while let Some(note) = sentence.notes().get(self.next_note) {
                if note.end_beat > beat {
                    break;
                }
                self.channels.note(NoteAnalyzed {
                    sentence_index,
                    note_index: self.next_note,
                    note: *note,
                });
                self.next_note += 1;
            }

            if beat < sentence.max_beat() {
                self.beat = self.beat.max(beat);
                return;
            }

            debug!(sentence_index, "sentence analyzed");
            self.channels.sentence(SentenceAnalyzed {
                sentence_index,
                recorded_notes: self.recorded.take(),
            });
            self.sentence = None;
            self.next_sentence = sentence_index + 1;
            self.beat = self.beat.max(sentence.max_beat());
        }
    }

    /// Round, apply the joker and emit `BeatAnalyzed` for one beat of the
    /// current sentence.
    fn judge_beat(&mut self, beat: i32, raw: Option<i32>, frequency_hz: Option<f32>) {
        let Some(sentence_index) = self.sentence else {
            return;
        };
        let target: Option<(usize, Note)> = self.song.sentences()[sentence_index]
            .note_at_beat(beat)
            .map(|(index, note)| (index, *note));

        let mut joker_used = false;
        let rounded = match (raw, target) {
            (None, _) => {
                self.joker.clear();
                None
            }
            (Some(raw), None) => Some(raw),
            (Some(raw), Some((_, note))) => {
                let rounded = round_to_target(
                    raw,
                    Some(&note),
                    &self.range,
                    self.config.difficulty.rounding_tolerance(),
                );
                let correct = is_correct(rounded.semitone, note.semitone);
                if self.joker.judge(correct, rounded.pitch_failure) {
                    debug!(beat, raw, target = note.semitone, "joker spent");
                    joker_used = true;
                    Some(note.semitone)
                } else {
                    Some(rounded.semitone)
                }
            }
        };

        let note = target.map(|(_, note)| note);
        self.recorded.record(beat, raw, rounded, note);

        self.channels.beat(BeatAnalyzed {
            beat,
            raw_semitone: raw,
            rounded_semitone: rounded,
            frequency_hz,
            joker_used,
            sentence_index,
            note_index: target.map(|(index, _)| index),
            note,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cantor_core::{remote_pitch_queue, NoteKind, PitchAlgorithm, Sentence};
    use std::f32::consts::PI;

    const SAMPLE_RATE: u32 = 44100;

    fn sine_block(semitone: i32, len: usize, phase: &mut f32) -> Vec<f32> {
        let freq = PitchRange::default().frequency_of(semitone);
        let step = 2.0 * PI * freq / SAMPLE_RATE as f32;
        (0..len)
            .map(|_| {
                let s = 0.8 * phase.sin();
                *phase = (*phase + step) % (2.0 * PI);
                s
            })
            .collect()
    }

    fn song(sentences: Vec<Vec<(i32, i32, i32, NoteKind)>>) -> Arc<Song> {
        let sentences = sentences
            .into_iter()
            .map(|notes| {
                let notes: Vec<Note> = notes
                    .into_iter()
                    .map(|(s, e, t, k)| Note::new(s, e, t, k).unwrap())
                    .collect();
                let line_break = notes.last().unwrap().end_beat;
                Sentence::new(notes, line_break).unwrap()
            })
            .collect();
        Arc::new(Song::new(120.0, 0.0, sentences).unwrap())
    }

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    fn device() -> DeviceConfig {
        DeviceConfig {
            algorithm: PitchAlgorithm::Yin,
            ..DeviceConfig::default()
        }
    }

    /// Run a local scheduler over `semitones`, one entry per 10 ms block.
    fn run_local(
        scheduler: &mut AnalysisScheduler,
        blocks: impl IntoIterator<Item = Option<i32>>,
    ) -> AudioRingBuffer {
        let mut buffer = AudioRingBuffer::for_sample_rate(SAMPLE_RATE);
        let block_len = SAMPLE_RATE as usize / 100;
        let mut phase = 0.0;
        for (i, semitone) in blocks.into_iter().enumerate() {
            let block = match semitone {
                Some(s) => sine_block(s, block_len, &mut phase),
                None => vec![0.0; block_len],
            };
            buffer.write(&block);
            scheduler.tick((i + 1) as f64 * 10.0, &buffer);
        }
        buffer
    }

    fn beats(rx: &Receiver<JudgeEvent>) -> Vec<BeatAnalyzed> {
        rx.try_iter()
            .filter_map(|e| match e {
                JudgeEvent::Beat(b) => Some(b),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_waits_for_complete_beat() {
        let song = song(vec![vec![(0, 4, 60, NoteKind::Normal)]]);
        let mut scheduler =
            AnalysisScheduler::local(song, &device(), JudgeConfig::default(), PitchRange::default())
                .unwrap();
        let rx = scheduler.subscribe_beats();
        assert_eq!(scheduler.state(), SchedulerState::Idle);

        // 490 ms: beat 0 (0..500 ms) not yet complete.
        run_local(&mut scheduler, std::iter::repeat(Some(60)).take(49));
        assert_eq!(scheduler.state(), SchedulerState::WaitingForSamples);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_local_sine_is_judged_correct() {
        let song = song(vec![vec![(0, 4, 60, NoteKind::Normal)]]);
        let mut scheduler =
            AnalysisScheduler::local(song, &device(), JudgeConfig::default(), PitchRange::default())
                .unwrap();
        let rx = scheduler.subscribe();

        run_local(&mut scheduler, std::iter::repeat(Some(60)).take(210));

        let events: Vec<JudgeEvent> = rx.try_iter().collect();
        let judged: Vec<_> = events
            .iter()
            .filter_map(|e| match e {
                JudgeEvent::Beat(b) => Some(b),
                _ => None,
            })
            .collect();
        assert_eq!(judged.len(), 4);
        assert!(judged.iter().all(|b| b.rounded_semitone == Some(60)));
        assert!(matches!(events[4], JudgeEvent::Note(_)));
        assert!(matches!(events[5], JudgeEvent::Sentence(_)));
        assert_eq!(scheduler.state(), SchedulerState::Finished);
    }

    #[test]
    fn test_silence_yields_unpitched_beats() {
        let song = song(vec![vec![(0, 2, 60, NoteKind::Normal)]]);
        let mut scheduler =
            AnalysisScheduler::local(song, &device(), JudgeConfig::default(), PitchRange::default())
                .unwrap();
        let rx = scheduler.subscribe();
        run_local(&mut scheduler, std::iter::repeat(None).take(110));

        let judged = beats(&rx);
        assert_eq!(judged.len(), 2);
        assert!(judged.iter().all(|b| b.raw_semitone.is_none()));
    }

    #[test]
    fn test_gap_between_notes_is_skipped() {
        let song = song(vec![vec![
            (0, 1, 60, NoteKind::Normal),
            (3, 4, 62, NoteKind::Normal),
        ]]);
        let mut scheduler =
            AnalysisScheduler::local(song, &device(), JudgeConfig::default(), PitchRange::default())
                .unwrap();
        let rx = scheduler.subscribe();
        run_local(&mut scheduler, std::iter::repeat(Some(60)).take(210));

        let judged: Vec<i32> = beats(&rx).iter().map(|b| b.beat).collect();
        assert_eq!(judged, [0, 3]);
    }

    #[test]
    fn test_gap_analyzed_when_enabled() {
        let song = song(vec![vec![
            (0, 1, 60, NoteKind::Normal),
            (3, 4, 62, NoteKind::Normal),
        ]]);
        let config = JudgeConfig {
            analyze_beats_without_target: true,
            ..JudgeConfig::default()
        };
        let mut scheduler =
            AnalysisScheduler::local(song, &device(), config, PitchRange::default()).unwrap();
        let rx = scheduler.subscribe();
        run_local(&mut scheduler, std::iter::repeat(Some(60)).take(210));

        let judged = beats(&rx);
        assert_eq!(judged.iter().map(|b| b.beat).collect::<Vec<_>>(), [0, 1, 2, 3]);
        assert!(judged[1].note.is_none());
    }

    #[test]
    fn test_stale_capture_disables() {
        init_tracing();
        let song = song(vec![vec![(0, 16, 60, NoteKind::Normal)]]);
        let mut scheduler =
            AnalysisScheduler::local(song, &device(), JudgeConfig::default(), PitchRange::default())
                .unwrap();
        let buffer = AudioRingBuffer::for_sample_rate(SAMPLE_RATE);
        scheduler.tick(0.0, &buffer);
        scheduler.tick(1000.0, &buffer);
        assert_ne!(scheduler.state(), SchedulerState::Disabled);
        scheduler.tick(2500.0, &buffer);
        assert_eq!(scheduler.state(), SchedulerState::Disabled);
    }

    #[test]
    fn test_cancel_drops_pending_without_events() {
        let song = song(vec![vec![(0, 8, 60, NoteKind::Normal)]]);
        let mut scheduler =
            AnalysisScheduler::local(song, &device(), JudgeConfig::default(), PitchRange::default())
                .unwrap();
        let rx = scheduler.subscribe();
        let mut buffer = run_local(&mut scheduler, std::iter::repeat(Some(60)).take(110));
        assert!(!scheduler.recorded_notes().is_empty());
        let before = rx.try_iter().count();
        assert_eq!(before, 2);

        scheduler.cancel();
        assert_eq!(scheduler.state(), SchedulerState::Idle);
        assert!(scheduler.recorded_notes().is_empty());

        buffer.write(&vec![0.5; 441]);
        scheduler.tick(3000.0, &buffer);
        scheduler.finish();
        assert!(rx.try_recv().is_err());
    }

    fn remote(song: Arc<Song>) -> (cantor_core::RemotePitchProducer, AnalysisScheduler) {
        let (producer, consumer) = remote_pitch_queue(64);
        let scheduler =
            AnalysisScheduler::remote(song, consumer, JudgeConfig::default(), PitchRange::default())
                .unwrap();
        (producer, scheduler)
    }

    fn event_kind(event: JudgeEvent) -> &'static str {
        match event {
            JudgeEvent::Beat(_) => "beat",
            JudgeEvent::Note(_) => "note",
            JudgeEvent::Sentence(_) => "sentence",
        }
    }

    fn event(beat: i32, semitone: i32) -> RemotePitchEvent {
        RemotePitchEvent {
            beat,
            semitone,
            frequency_hz: 0.0,
        }
    }

    #[test]
    fn test_remote_joker_round_trip() {
        let song = song(vec![vec![(0, 8, 60, NoteKind::Normal)]]);
        let (mut producer, mut scheduler) = remote(song);
        let rx = scheduler.subscribe_beats();

        // correct, wrong (joker), correct, wrong (joker), wrong
        for (beat, semitone) in [(0, 60), (1, 66), (2, 60), (3, 66), (4, 66)] {
            producer.push(event(beat, semitone));
        }
        scheduler.tick_remote(5000.0);

        let judged: Vec<BeatAnalyzed> = rx.try_iter().collect();
        let jokers: Vec<bool> = judged.iter().map(|b| b.joker_used).collect();
        assert_eq!(jokers, [false, true, false, true, false]);
        assert_eq!(judged[1].rounded_semitone, Some(60));
        assert_eq!(judged[4].rounded_semitone, Some(66));
        assert_eq!(scheduler.used_joker_count(), 2);
    }

    #[test]
    fn test_remote_drops_late_and_future_events() {
        init_tracing();
        let song = song(vec![vec![(0, 16, 60, NoteKind::Normal)]]);
        let (mut producer, mut scheduler) = remote(song);
        let rx = scheduler.subscribe_beats();

        producer.push(event(4, 60));
        producer.push(event(2, 60)); // before last accepted
        producer.push(event(4, 60)); // equal is accepted
        producer.push(event(9, 60)); // song is at beat 5
        scheduler.tick_remote(2750.0);

        let judged: Vec<i32> = rx.try_iter().map(|b| b.beat).collect();
        assert_eq!(judged, [4, 4]);
    }

    #[test]
    fn test_remote_finish_flushes_notes_and_sentences() {
        let song = song(vec![
            vec![(0, 2, 60, NoteKind::Normal), (2, 4, 62, NoteKind::Golden)],
            vec![(8, 10, 64, NoteKind::Normal)],
        ]);
        let (mut producer, mut scheduler) = remote(song);
        let rx = scheduler.subscribe();

        producer.push(event(1, 60));
        scheduler.tick_remote(1000.0);
        scheduler.finish();

        let kinds: Vec<&str> = rx
            .try_iter()
            .map(|e| match e {
                JudgeEvent::Beat(_) => "beat",
                JudgeEvent::Note(_) => "note",
                JudgeEvent::Sentence(_) => "sentence",
            })
            .collect();
        assert_eq!(
            kinds,
            ["beat", "note", "note", "sentence", "note", "sentence"]
        );
        assert_eq!(scheduler.state(), SchedulerState::Finished);
    }

    #[test]
    fn test_remote_event_closes_passed_sentence() {
        let song = song(vec![
            vec![(0, 2, 60, NoteKind::Normal)],
            vec![(4, 8, 64, NoteKind::Normal)],
        ]);
        let (mut producer, mut scheduler) = remote(song);
        let rx = scheduler.subscribe_sentences();

        producer.push(event(0, 60));
        producer.push(event(5, 64));
        scheduler.tick_remote(3000.0);

        let sentence = rx.try_recv().unwrap();
        assert_eq!(sentence.sentence_index, 0);
        assert_eq!(sentence.recorded_notes.len(), 1);
        assert_eq!(scheduler.current_sentence(), Some(1));
        assert_eq!(scheduler.recorded_notes().len(), 1);
    }

    #[test]
    fn test_remote_silence_still_closes_sentences() {
        let song = song(vec![
            vec![(0, 2, 60, NoteKind::Normal)],
            vec![(4, 6, 64, NoteKind::Normal)],
        ]);
        let (mut producer, mut scheduler) = remote(song);
        let rx = scheduler.subscribe();

        producer.push(event(0, 60));
        scheduler.tick_remote(500.0);
        assert!(matches!(rx.try_recv(), Ok(JudgeEvent::Beat(_))));
        assert!(rx.try_recv().is_err());

        // Beat 4 is in progress: only the first sentence has passed.
        scheduler.tick_remote(2000.0);
        let kinds: Vec<&str> = rx.try_iter().map(event_kind).collect();
        assert_eq!(kinds, ["note", "sentence"]);
        assert_eq!(scheduler.current_sentence(), Some(1));

        scheduler.tick_remote(5000.0);
        let kinds: Vec<&str> = rx.try_iter().map(event_kind).collect();
        assert_eq!(kinds, ["note", "sentence"]);
        assert_eq!(scheduler.state(), SchedulerState::Finished);
    }

    #[test]
    fn test_remote_event_for_analyzed_note_is_dropped() {
        init_tracing();
        let song = song(vec![vec![
            (0, 2, 60, NoteKind::Normal),
            (2, 6, 62, NoteKind::Normal),
        ]]);
        let (mut producer, mut scheduler) = remote(song);
        let rx = scheduler.subscribe_beats();

        scheduler.tick_remote(1500.0);
        producer.push(event(1, 60)); // note 0 already reported
        producer.push(event(3, 62));
        scheduler.tick_remote(1750.0);

        let judged: Vec<i32> = rx.try_iter().map(|b| b.beat).collect();
        assert_eq!(judged, [3]);
    }

    #[test]
    fn test_freestyle_accepts_any_pitch() {
        let song = song(vec![vec![(0, 2, 60, NoteKind::Freestyle)]]);
        let (mut producer, mut scheduler) = remote(song);
        let rx = scheduler.subscribe_beats();
        producer.push(event(0, 71));
        scheduler.tick_remote(1000.0);
        assert_eq!(rx.try_recv().unwrap().rounded_semitone, Some(60));
    }

    #[test]
    fn test_disabled_scheduler_ignores_input() {
        let song = song(vec![vec![(0, 2, 60, NoteKind::Normal)]]);
        let (mut producer, mut scheduler) = remote(song);
        let rx = scheduler.subscribe();
        scheduler.disable("device unplugged");
        producer.push(event(0, 60));
        scheduler.tick_remote(1000.0);
        scheduler.finish();
        assert!(rx.try_recv().is_err());
        assert_eq!(scheduler.state(), SchedulerState::Disabled);
    }
}
