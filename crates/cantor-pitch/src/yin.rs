//! YIN pitch estimation.
//!
//! ## Algorithm
//!
//! 1. **Difference function** - d(τ) = Σ(x[j] - x[j+τ])² over the first half
//!    of the window
//! 2. **Cumulative mean normalized difference** - d'(τ) = d(τ)·τ / Σd(1..=τ)
//! 3. **Minimum search** - first local minimum of d' below the threshold,
//!    otherwise the lowest local minimum seen
//! 4. **Parabolic interpolation** on the raw difference values
//! 5. **Confidence smoothing** - a sudden confidence drop reuses the previous
//!    frequency at half the previous confidence
//!
//! Runs in O(n²/4) per window using direct computation.

use cantor_core::{PitchAlgorithm, PitchRange};

use crate::estimator::{FrequencyEstimate, PitchEstimator, PitchEvent};
use crate::quantizer::SemitoneQuantizer;

/// Default absolute threshold on d'.
pub const DEFAULT_THRESHOLD: f32 = 0.1;

/// A drop below this fraction of the previous confidence triggers smoothing.
const CONFIDENCE_DROP_RATIO: f32 = 0.5;

/// YIN estimator with pre-allocated work buffers.
#[derive(Debug, Clone)]
pub struct YinEstimator {
    sample_rate: f32,
    threshold: f32,
    quantizer: SemitoneQuantizer,
    difference: Vec<f32>,
    cumulative_mean: Vec<f32>,
    previous: Option<FrequencyEstimate>,
}

impl YinEstimator {
    /// Create an estimator for `sample_rate` quantizing into `range`.
    pub fn new(sample_rate: u32, range: PitchRange) -> Self {
        Self {
            sample_rate: sample_rate as f32,
            threshold: DEFAULT_THRESHOLD,
            quantizer: SemitoneQuantizer::new(range),
            difference: Vec::new(),
            cumulative_mean: Vec::new(),
            previous: None,
        }
    }

    /// Set the d' threshold (0.01 - 0.5).
    ///
    /// Lower values are stricter and fall back to the lowest minimum more often.
    pub fn set_threshold(&mut self, threshold: f32) {
        self.threshold = threshold.clamp(0.01, 0.5);
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Estimate the fundamental frequency of `window` without quantizing.
    pub fn estimate_frequency(&mut self, window: &[f32]) -> Option<FrequencyEstimate> {
        let half = window.len() / 2;
        if half < 3 {
            self.previous = None;
            return None;
        }

        self.compute_difference(window, half);
        self.compute_cumulative_mean(half);

        let Some(tau) = self.find_minimum(half) else {
            self.previous = None;
            return None;
        };

        let period = self.parabolic_interpolation(tau, half);
        let frequency_hz = self.sample_rate / period;
        if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
            self.previous = None;
            return None;
        }

        let confidence = (1.0 - self.cumulative_mean[tau]).clamp(0.0, 1.0);
        let estimate = match self.previous {
            Some(previous) if confidence < previous.confidence * CONFIDENCE_DROP_RATIO => {
                FrequencyEstimate {
                    frequency_hz: previous.frequency_hz,
                    confidence: previous.confidence * CONFIDENCE_DROP_RATIO,
                }
            }
            _ => FrequencyEstimate {
                frequency_hz,
                confidence,
            },
        };

        self.previous = Some(estimate);
        Some(estimate)
    }

    fn compute_difference(&mut self, window: &[f32], half: usize) {
        self.difference.clear();
        self.difference.resize(half, 0.0);

        for tau in 1..half {
            let mut sum = 0.0f32;
            for j in 0..half {
                let delta = window[j] - window[j + tau];
                sum += delta * delta;
            }
            self.difference[tau] = sum;
        }
    }

    fn compute_cumulative_mean(&mut self, half: usize) {
        self.cumulative_mean.clear();
        self.cumulative_mean.resize(half, 1.0);

        let mut running_sum = 0.0f32;
        for tau in 1..half {
            running_sum += self.difference[tau];
            if running_sum > 1e-10 {
                self.cumulative_mean[tau] = self.difference[tau] * tau as f32 / running_sum;
            }
        }
    }

    /// First local minimum of d' below the threshold, else the lowest local
    /// minimum. `None` when d' has no local minimum at all.
    fn find_minimum(&self, half: usize) -> Option<usize> {
        let cmnd = &self.cumulative_mean;
        let mut best: Option<usize> = None;

        for tau in 1..half - 1 {
            let is_minimum = cmnd[tau] < cmnd[tau - 1] && cmnd[tau] <= cmnd[tau + 1];
            if !is_minimum {
                continue;
            }
            if cmnd[tau] < self.threshold {
                return Some(tau);
            }
            if best.map_or(true, |b| cmnd[tau] < cmnd[b]) {
                best = Some(tau);
            }
        }

        best
    }

    /// Refine `tau` on the raw difference values.
    ///
    /// Slides to a neighbouring lower raw value first so the parabola is fit
    /// around an actual minimum of d.
    fn parabolic_interpolation(&self, tau: usize, half: usize) -> f32 {
        let d = &self.difference;
        let mut tau = tau;
        while tau > 1 && d[tau - 1] < d[tau] {
            tau -= 1;
        }
        while tau + 1 < half && d[tau + 1] < d[tau] {
            tau += 1;
        }

        if tau < 1 || tau + 1 >= half {
            return tau as f32;
        }

        let s0 = d[tau - 1];
        let s1 = d[tau];
        let s2 = d[tau + 1];
        let denominator = 2.0 * (2.0 * s1 - s2 - s0);

        if denominator.abs() > 1e-10 {
            tau as f32 + (s2 - s0) / denominator
        } else {
            tau as f32
        }
    }
}

impl PitchEstimator for YinEstimator {
    fn estimate(&mut self, window: &[f32]) -> Option<PitchEvent> {
        let estimate = self.estimate_frequency(window)?;
        Some(PitchEvent {
            semitone: self.quantizer.frequency_to_semitone(estimate.frequency_hz),
            frequency_hz: Some(estimate.frequency_hz),
            confidence: Some(estimate.confidence),
        })
    }

    fn reset(&mut self) {
        self.previous = None;
    }

    fn algorithm(&self) -> PitchAlgorithm {
        PitchAlgorithm::Yin
    }
}
