//! Builder for configuring and constructing a `Session`.

use std::sync::Arc;

use cantor_core::Song;
use cantor_judge::ScoreConfig;

use crate::session::{PlayerJudge, PlayerSetup, Session};
use crate::{Error, Result};

/// A player whose setup fails to build fails the whole session; a player
/// whose capture device is unavailable is built disabled instead.
#[derive(Default)]
pub struct SessionBuilder {
    song: Option<Arc<Song>>,
    score: ScoreConfig,
    players: Vec<PlayerSetup>,
}

impl SessionBuilder {
    pub fn song(mut self, song: impl Into<Arc<Song>>) -> Self {
        self.song = Some(song.into());
        self
    }

    /// Default: 10000 points, 1000 of them sentence bonus.
    pub fn score_config(mut self, config: ScoreConfig) -> Self {
        self.score = config;
        self
    }

    pub fn player(mut self, setup: PlayerSetup) -> Self {
        self.players.push(setup);
        self
    }

    pub fn build(self) -> Result<Session> {
        let song = self.song.ok_or(Error::MissingSong)?;
        self.score.validate()?;

        let players = self
            .players
            .into_iter()
            .map(|setup| PlayerJudge::build(&song, setup, &self.score))
            .collect::<Result<Vec<_>>>()?;

        Ok(Session::from_parts(song, players))
    }
}
