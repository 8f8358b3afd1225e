//! Device, pitch-range and judging configuration.

use crate::{Error, Result};

/// Pitch detection algorithm selected per input device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum PitchAlgorithm {
    /// YIN-style cumulative mean normalized difference.
    #[default]
    Yin,
    /// Dynamic wavelet pitch tracking (multi-level extrema histogram).
    Dywa,
    /// Circular average magnitude difference over semitone delays.
    Camdf,
}

/// Input device parameters.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct DeviceConfig {
    pub sample_rate: u32,
    /// Latency between singing and the samples reaching the buffer.
    pub input_delay_ms: f64,
    /// Gain applied when samples are written to the ring buffer.
    pub amplification: f32,
    /// Windows whose peak amplitude is below this percentage of full scale
    /// are treated as silence.
    pub noise_threshold_percent: f32,
    pub algorithm: PitchAlgorithm,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            sample_rate: 44100,
            input_delay_ms: 0.0,
            amplification: 1.0,
            noise_threshold_percent: 5.0,
            algorithm: PitchAlgorithm::default(),
        }
    }
}

impl DeviceConfig {
    pub fn validate(&self) -> Result<()> {
        if !(8000..=192_000).contains(&self.sample_rate) {
            return Err(Error::InvalidSampleRate(self.sample_rate));
        }
        if !self.input_delay_ms.is_finite() || self.input_delay_ms < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "input_delay_ms {} must be finite and non-negative",
                self.input_delay_ms
            )));
        }
        if !self.amplification.is_finite() || self.amplification <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "amplification {} must be positive",
                self.amplification
            )));
        }
        if !(0.0..=100.0).contains(&self.noise_threshold_percent) {
            return Err(Error::InvalidConfig(format!(
                "noise_threshold_percent {} out of range (0-100)",
                self.noise_threshold_percent
            )));
        }
        Ok(())
    }

    /// Noise threshold as a linear amplitude in [0, 1].
    #[inline]
    pub fn noise_threshold(&self) -> f32 {
        self.noise_threshold_percent / 100.0
    }
}

/// Singable semitone range and the concert pitch anchoring it.
///
/// Semitones use MIDI numbering: 60 is middle C, 69 is A4.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct PitchRange {
    pub min_semitone: i32,
    pub max_semitone: i32,
    pub concert_pitch_hz: f32,
    pub concert_pitch_semitone: i32,
}

impl Default for PitchRange {
    fn default() -> Self {
        Self {
            min_semitone: 36,
            max_semitone: 84,
            concert_pitch_hz: 440.0,
            concert_pitch_semitone: 69,
        }
    }
}

impl PitchRange {
    pub fn validate(&self) -> Result<()> {
        if self.min_semitone > self.max_semitone {
            return Err(Error::InvalidConfig(format!(
                "pitch range {}..={} is empty",
                self.min_semitone, self.max_semitone
            )));
        }
        if !self.concert_pitch_hz.is_finite() || self.concert_pitch_hz <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "concert pitch {} Hz must be positive",
                self.concert_pitch_hz
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn contains(&self, semitone: i32) -> bool {
        (self.min_semitone..=self.max_semitone).contains(&semitone)
    }

    /// Number of semitones in the range (inclusive).
    #[inline]
    pub fn len(&self) -> usize {
        (self.max_semitone - self.min_semitone + 1).max(0) as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Equal-tempered center frequency of a semitone.
    #[inline]
    pub fn frequency_of(&self, semitone: i32) -> f32 {
        let offset = (semitone - self.concert_pitch_semitone) as f32;
        self.concert_pitch_hz * 2.0f32.powf(offset / 12.0)
    }
}

/// Difficulty level; controls how far off a sung pitch may be and still
/// snap to the target note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    /// Rounding tolerance in semitones.
    pub fn rounding_tolerance(self) -> i32 {
        match self {
            Difficulty::Easy => 2,
            Difficulty::Medium => 1,
            Difficulty::Hard => 0,
        }
    }
}

/// Per-player judging options.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct JudgeConfig {
    pub difficulty: Difficulty,
    /// Analyze beats between notes too (feeds recorded notes only).
    pub analyze_beats_without_target: bool,
    /// Playback time without new captured samples after which the capture
    /// device is considered gone.
    pub stale_capture_ms: f64,
    /// Upper bound on samples handed to the estimator per beat; the newest
    /// samples of the beat window are kept.
    pub max_analysis_samples: usize,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::default(),
            analyze_beats_without_target: false,
            stale_capture_ms: 2000.0,
            max_analysis_samples: 2048,
        }
    }
}

impl JudgeConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.stale_capture_ms.is_finite() || self.stale_capture_ms <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "stale_capture_ms {} must be positive",
                self.stale_capture_ms
            )));
        }
        if self.max_analysis_samples < 256 {
            return Err(Error::InvalidConfig(format!(
                "max_analysis_samples {} is below the 256-sample minimum window",
                self.max_analysis_samples
            )));
        }
        Ok(())
    }
}
