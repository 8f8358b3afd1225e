//! Beat -> ring buffer sample range.
//!
//! The newest captured sample sits at chronological index `len - 1`. A beat
//! that started `t` ms ago (after removing the input delay) therefore begins
//! `t · sample_rate / 1000` samples before the end of the buffer.

use core::ops::Range;

use cantor_core::{DeviceConfig, Song};

/// Chronological sample range covering one beat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatWindow {
    pub start: usize,
    pub end: usize,
}

impl BeatWindow {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// The newest `max_samples` of the window.
    pub fn newest(&self, max_samples: usize) -> Range<usize> {
        self.end.saturating_sub(max_samples).max(self.start)..self.end
    }
}

/// Converts beats to ring buffer indices for one input device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BeatSampleMapper {
    sample_rate: u32,
    input_delay_ms: f64,
}

impl BeatSampleMapper {
    pub fn new(sample_rate: u32, input_delay_ms: f64) -> Self {
        Self {
            sample_rate,
            input_delay_ms,
        }
    }

    pub fn from_config(config: &DeviceConfig) -> Self {
        Self::new(config.sample_rate, config.input_delay_ms)
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn input_delay_ms(&self) -> f64 {
        self.input_delay_ms
    }

    /// Chronological buffer index where `beat` starts, clamped to
    /// `[0, buffer_len - 1]`.
    pub fn sample_index(&self, song: &Song, beat: i32, playback_ms: f64, buffer_len: usize) -> usize {
        if buffer_len == 0 {
            return 0;
        }
        let elapsed_ms = playback_ms - song.beat_to_millis(beat as f64);
        let samples_elapsed =
            ((elapsed_ms - self.input_delay_ms) / 1000.0 * self.sample_rate as f64).round() as i64;
        let index = buffer_len as i64 - samples_elapsed;
        index.clamp(0, buffer_len as i64 - 1) as usize
    }

    /// Sample range from the start of `beat` to the start of `beat + 1`.
    pub fn beat_window(
        &self,
        song: &Song,
        beat: i32,
        playback_ms: f64,
        buffer_len: usize,
    ) -> BeatWindow {
        let a = self.sample_index(song, beat, playback_ms, buffer_len);
        let b = self.sample_index(song, beat + 1, playback_ms, buffer_len);
        BeatWindow {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// True once every sample of `beat` has reached the buffer.
    pub fn is_beat_captured(&self, song: &Song, beat: i32, playback_ms: f64) -> bool {
        playback_ms - self.input_delay_ms >= song.beat_to_millis(beat as f64 + 1.0)
    }
}
