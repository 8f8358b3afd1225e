//! Monophonic pitch estimation for sung input.
//!
//! Three interchangeable estimators share the [`PitchEstimator`] trait:
//!
//! - [`YinEstimator`] - cumulative mean normalized difference
//! - [`DywaEstimator`] - dynamic wavelet extrema histogram
//! - [`CamdfEstimator`] - circular difference over semitone delays
//!
//! [`PitchDetector`] selects one per device and gates short or quiet windows.
//! [`SemitoneQuantizer`] maps frequencies to the singable semitone range and
//! [`PitchTrackJob`] runs a detector over a recorded take in the background.
//!
//! ## Example
//!
//! ```
//! use cantor_pitch::{PitchDetector, PitchAlgorithm, PitchRange};
//!
//! let mut detector = PitchDetector::new(PitchAlgorithm::Yin, 44100, PitchRange::default());
//! let window: Vec<f32> = (0..2048)
//!     .map(|i| 0.8 * (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 44100.0).sin())
//!     .collect();
//! assert_eq!(detector.detect(&window).map(|e| e.semitone), Some(69));
//! ```

pub mod camdf;
pub mod dywa;
pub mod error;
pub mod estimator;
pub mod quantizer;
pub mod track;
pub mod window;
pub mod yin;

#[cfg(test)]
mod test_signal;

pub use cantor_core::{PitchAlgorithm, PitchRange};

pub use camdf::CamdfEstimator;
pub use dywa::DywaEstimator;
pub use error::{Error, Result};
pub use estimator::{
    Estimator, FrequencyEstimate, PitchDetector, PitchEstimator, PitchEvent, MIN_WINDOW_SAMPLES,
};
pub use quantizer::SemitoneQuantizer;
pub use track::{PitchTrack, PitchTrackJob, TrackProgress};
pub use yin::YinEstimator;
