//! Tolerance constants for judge testing.
//!
//! Different checks require different precision levels.

/// Floating point rounding errors (exact arithmetic such as gain).
pub const FLOAT_EPSILON: f32 = 1e-6;

/// Pitch detection tolerance in semitones.
/// Estimators may land one semitone off near a semitone boundary.
pub const SEMITONE_TOLERANCE: i32 = 1;

/// Relative frequency tolerance (~1/3 semitone).
pub const FREQUENCY_RATIO_EPSILON: f32 = 0.02;

/// Silence threshold (~-80dB).
pub const SILENCE_THRESHOLD: f32 = 0.0001;
