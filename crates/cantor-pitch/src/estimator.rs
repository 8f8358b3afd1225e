//! Estimator trait and the runtime-selected detector.
//!
//! Every algorithm implements [`PitchEstimator`]. [`PitchDetector`] picks one
//! per [`PitchAlgorithm`] and applies the shared input gates before the
//! algorithm sees any samples:
//!
//! - windows shorter than [`MIN_WINDOW_SAMPLES`] yield no pitch
//! - windows whose peak amplitude is below the noise threshold yield no
//!   pitch and clear the estimator's history

use cantor_core::{DeviceConfig, PitchAlgorithm, PitchRange};
use tracing::trace;

use crate::camdf::CamdfEstimator;
use crate::dywa::DywaEstimator;
use crate::window::peak_amplitude;
use crate::yin::YinEstimator;

/// Windows shorter than this are never analyzed.
pub const MIN_WINDOW_SAMPLES: usize = 256;

/// One detected pitch.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct PitchEvent {
    /// Quantized semitone (MIDI numbering).
    pub semitone: i32,
    /// Estimated fundamental in Hz, when the algorithm produces one.
    pub frequency_hz: Option<f32>,
    /// Detection confidence in [0, 1], when the algorithm produces one.
    pub confidence: Option<f32>,
}

/// Frequency estimate before quantization.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrequencyEstimate {
    pub frequency_hz: f32,
    pub confidence: f32,
}

/// A monophonic pitch estimator.
pub trait PitchEstimator {
    /// Analyze one window. `None` means no pitch.
    fn estimate(&mut self, window: &[f32]) -> Option<PitchEvent>;

    /// Forget any history carried between windows.
    fn reset(&mut self);

    fn algorithm(&self) -> PitchAlgorithm;
}

/// Concrete estimator chosen at configuration time.
#[derive(Debug, Clone)]
pub enum Estimator {
    Yin(YinEstimator),
    Dywa(DywaEstimator),
    Camdf(CamdfEstimator),
}

impl Estimator {
    pub fn new(algorithm: PitchAlgorithm, sample_rate: u32, range: PitchRange) -> Self {
        match algorithm {
            PitchAlgorithm::Yin => Self::Yin(YinEstimator::new(sample_rate, range)),
            PitchAlgorithm::Dywa => Self::Dywa(DywaEstimator::new(sample_rate, range)),
            PitchAlgorithm::Camdf => Self::Camdf(CamdfEstimator::new(sample_rate, range)),
        }
    }
}

impl PitchEstimator for Estimator {
    fn estimate(&mut self, window: &[f32]) -> Option<PitchEvent> {
        match self {
            Self::Yin(e) => e.estimate(window),
            Self::Dywa(e) => e.estimate(window),
            Self::Camdf(e) => e.estimate(window),
        }
    }

    fn reset(&mut self) {
        match self {
            Self::Yin(e) => e.reset(),
            Self::Dywa(e) => e.reset(),
            Self::Camdf(e) => e.reset(),
        }
    }

    fn algorithm(&self) -> PitchAlgorithm {
        match self {
            Self::Yin(_) => PitchAlgorithm::Yin,
            Self::Dywa(_) => PitchAlgorithm::Dywa,
            Self::Camdf(_) => PitchAlgorithm::Camdf,
        }
    }
}

/// Gated pitch detector for one input device.
#[derive(Debug, Clone)]
pub struct PitchDetector {
    estimator: Estimator,
    noise_threshold: f32,
}

impl PitchDetector {
    pub fn new(algorithm: PitchAlgorithm, sample_rate: u32, range: PitchRange) -> Self {
        Self {
            estimator: Estimator::new(algorithm, sample_rate, range),
            noise_threshold: DeviceConfig::default().noise_threshold(),
        }
    }

    /// Build a detector from a validated device configuration.
    pub fn from_config(config: &DeviceConfig, range: PitchRange) -> crate::Result<Self> {
        config.validate()?;
        range.validate()?;
        Ok(Self::new(config.algorithm, config.sample_rate, range)
            .with_noise_threshold(config.noise_threshold()))
    }

    /// Set the peak amplitude (0..=1) below which a window counts as silence.
    pub fn with_noise_threshold(mut self, threshold: f32) -> Self {
        self.set_noise_threshold(threshold);
        self
    }

    pub fn set_noise_threshold(&mut self, threshold: f32) {
        self.noise_threshold = threshold.clamp(0.0, 1.0);
    }

    pub fn noise_threshold(&self) -> f32 {
        self.noise_threshold
    }

    pub fn algorithm(&self) -> PitchAlgorithm {
        self.estimator.algorithm()
    }

    pub fn estimator(&self) -> &Estimator {
        &self.estimator
    }

    /// Detect the pitch of one window.
    pub fn detect(&mut self, window: &[f32]) -> Option<PitchEvent> {
        if window.len() < MIN_WINDOW_SAMPLES {
            trace!(len = window.len(), "window too short");
            self.estimator.reset();
            return None;
        }
        if peak_amplitude(window) < self.noise_threshold {
            self.estimator.reset();
            return None;
        }
        self.estimator.estimate(window)
    }

    pub fn reset(&mut self) {
        self.estimator.reset();
    }
}
