//! A judged song: one scheduler and one score engine per player.

use std::sync::Arc;

use cantor_core::{
    remote_pitch_queue, AudioRingBuffer, DeviceConfig, JudgeConfig, PitchRange,
    RemotePitchProducer, Song,
};
use cantor_judge::{AnalysisScheduler, JudgeEvent, ScoreConfig, ScoreEngine, ScoreSnapshot};
use crossbeam_channel::Receiver;
use tracing::{info, warn};

use crate::{Error, Result, SessionBuilder};

/// Default capacity of a remote player's pitch event queue.
pub const DEFAULT_REMOTE_QUEUE_CAPACITY: usize = 256;

/// How a player's pitch reaches the judge.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerInput {
    /// Local capture device feeding a ring buffer.
    Microphone(DeviceConfig),
    /// The capture device could not be opened.
    Unavailable { device: DeviceConfig, reason: String },
    /// Pitch events detected on another device.
    Remote { queue_capacity: usize },
}

/// Everything needed to judge one player.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSetup {
    pub name: String,
    pub input: PlayerInput,
    pub judge: JudgeConfig,
    pub range: PitchRange,
}

impl PlayerSetup {
    pub fn microphone(name: impl Into<String>, device: DeviceConfig) -> Self {
        Self::with_input(name, PlayerInput::Microphone(device))
    }

    pub fn remote(name: impl Into<String>) -> Self {
        Self::with_input(
            name,
            PlayerInput::Remote {
                queue_capacity: DEFAULT_REMOTE_QUEUE_CAPACITY,
            },
        )
    }

    pub fn unavailable(name: impl Into<String>, device: DeviceConfig, reason: impl Into<String>) -> Self {
        Self::with_input(
            name,
            PlayerInput::Unavailable {
                device,
                reason: reason.into(),
            },
        )
    }

    fn with_input(name: impl Into<String>, input: PlayerInput) -> Self {
        Self {
            name: name.into(),
            input,
            judge: JudgeConfig::default(),
            range: PitchRange::default(),
        }
    }

    pub fn judge_config(mut self, judge: JudgeConfig) -> Self {
        self.judge = judge;
        self
    }

    pub fn pitch_range(mut self, range: PitchRange) -> Self {
        self.range = range;
        self
    }
}

/// Judge state for one player.
pub struct PlayerJudge {
    name: String,
    scheduler: AnalysisScheduler,
    score: ScoreEngine,
    events: Receiver<JudgeEvent>,
    buffer: Option<AudioRingBuffer>,
    remote: Option<RemotePitchProducer>,
}

impl PlayerJudge {
    pub(crate) fn build(song: &Arc<Song>, setup: PlayerSetup, score: &ScoreConfig) -> Result<Self> {
        let PlayerSetup {
            name,
            input,
            judge,
            range,
        } = setup;

        let (mut scheduler, buffer, remote) = match input {
            PlayerInput::Microphone(device) => {
                let scheduler = AnalysisScheduler::local(Arc::clone(song), &device, judge, range)?;
                let mut buffer = AudioRingBuffer::for_sample_rate(device.sample_rate);
                buffer.set_amplification(device.amplification);
                (scheduler, Some(buffer), None)
            }
            PlayerInput::Unavailable { device, reason } => {
                let mut scheduler =
                    AnalysisScheduler::local(Arc::clone(song), &device, judge, range)?;
                warn!(player = %name, %reason, "capture device unavailable");
                scheduler.disable(&reason);
                (scheduler, None, None)
            }
            PlayerInput::Remote { queue_capacity } => {
                let (producer, consumer) = remote_pitch_queue(queue_capacity);
                let scheduler = AnalysisScheduler::remote(Arc::clone(song), consumer, judge, range)?;
                (scheduler, None, Some(producer))
            }
        };

        let events = scheduler.subscribe();
        let score = ScoreEngine::new(Arc::clone(song), score.clone())?;
        Ok(Self {
            name,
            scheduler,
            score,
            events,
            buffer,
            remote,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn scheduler(&self) -> &AnalysisScheduler {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut AnalysisScheduler {
        &mut self.scheduler
    }

    pub fn score(&self) -> &ScoreEngine {
        &self.score
    }

    pub fn score_mut(&mut self) -> &mut ScoreEngine {
        &mut self.score
    }

    pub fn snapshot(&self) -> ScoreSnapshot {
        self.score.snapshot()
    }

    /// Capture buffer of a microphone player.
    pub fn buffer(&self) -> Option<&AudioRingBuffer> {
        self.buffer.as_ref()
    }

    /// Hand out the producer end of a remote player's queue. Only the first
    /// call returns it.
    pub fn take_remote_producer(&mut self) -> Option<RemotePitchProducer> {
        self.remote.take()
    }

    /// Append captured samples. Ignored for players without a capture buffer.
    pub fn write_samples(&mut self, block: &[f32]) {
        if let Some(buffer) = &mut self.buffer {
            buffer.write(block);
        }
    }

    fn tick(&mut self, position_ms: f64) {
        match &self.buffer {
            Some(buffer) => self.scheduler.tick(position_ms, buffer),
            None => self.scheduler.tick_remote(position_ms),
        }
        self.score.consume(&self.events);
    }

    fn finish(&mut self) {
        self.scheduler.finish();
        self.score.consume(&self.events);
    }
}

/// A song being judged for any number of players.
///
/// # Example
///
/// ```
/// use cantor::prelude::*;
///
/// let note = Note::new(0, 4, 60, NoteKind::Normal)?;
/// let song = Song::new(120.0, 0.0, vec![Sentence::new(vec![note], 4)?])?;
///
/// let mut session = Session::builder()
///     .song(song)
///     .player(PlayerSetup::microphone("P1", DeviceConfig::default()))
///     .build()?;
///
/// session.write_samples(0, &[0.0; 441])?;
/// session.tick(10.0);
/// # Ok::<(), cantor::Error>(())
/// ```
pub struct Session {
    song: Arc<Song>,
    players: Vec<PlayerJudge>,
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    pub(crate) fn from_parts(song: Arc<Song>, players: Vec<PlayerJudge>) -> Self {
        info!(players = players.len(), bpm = song.bpm(), "session built");
        Self { song, players }
    }

    pub fn song(&self) -> &Arc<Song> {
        &self.song
    }

    pub fn players(&self) -> &[PlayerJudge] {
        &self.players
    }

    pub fn player(&self, index: usize) -> Result<&PlayerJudge> {
        self.players.get(index).ok_or(Error::UnknownPlayer(index))
    }

    pub fn player_mut(&mut self, index: usize) -> Result<&mut PlayerJudge> {
        self.players.get_mut(index).ok_or(Error::UnknownPlayer(index))
    }

    /// Feed captured samples to one player.
    pub fn write_samples(&mut self, player: usize, block: &[f32]) -> Result<()> {
        self.player_mut(player)?.write_samples(block);
        Ok(())
    }

    /// Judge every player up to `position_ms` and update their scores.
    pub fn tick(&mut self, position_ms: f64) {
        for player in &mut self.players {
            player.tick(position_ms);
        }
    }

    /// Report everything not yet judged and settle the scores.
    pub fn finish(&mut self) {
        for player in &mut self.players {
            player.finish();
        }
    }

    /// Stop judging every player without further events.
    pub fn cancel(&mut self) {
        for player in &mut self.players {
            player.scheduler.cancel();
        }
    }

    /// Disable one player, e.g. after its capture device disappeared.
    pub fn disable_player(&mut self, player: usize, reason: &str) -> Result<()> {
        self.player_mut(player)?.scheduler.disable(reason);
        Ok(())
    }

    pub fn snapshots(&self) -> Vec<ScoreSnapshot> {
        self.players.iter().map(PlayerJudge::snapshot).collect()
    }
}
