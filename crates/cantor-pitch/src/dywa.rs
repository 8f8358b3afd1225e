//! Dynamic wavelet pitch tracking.
//!
//! Each level finds the signal's local extrema, histograms the distances
//! between nearby extrema of the same kind and takes the dominant distance.
//! The signal is then halved by averaging sample pairs. When a level's
//! dominant distance agrees with the previous one (scaled by two), the
//! previous level's period is taken as the pitch.
//!
//! A small post-processor tracks the last accepted pitch with a confidence
//! counter, smoothing dropouts and correcting octave jumps once it is
//! confident.

use cantor_core::{PitchAlgorithm, PitchRange};

use crate::estimator::{FrequencyEstimate, PitchEstimator, PitchEvent};
use crate::quantizer::SemitoneQuantizer;
use crate::window::floor_power_of_two;

const MAX_LEVELS: usize = 6;
const MAX_FREQUENCY_HZ: f32 = 3000.0;
/// Extrema paired with up to this many successors (exclusive).
const DIFFERENCE_LEVELS: usize = 3;
const MAXIMA_THRESHOLD_RATIO: f32 = 0.75;

const ACCEPTED_ERROR: f32 = 0.2;
const MAX_CONFIDENCE: u32 = 5;
/// Octave correction only kicks in at this confidence.
const OCTAVE_CONFIDENCE: u32 = MAX_CONFIDENCE - 2;

#[derive(Debug, Clone)]
pub struct DywaEstimator {
    sample_rate: f32,
    quantizer: SemitoneQuantizer,
    samples: Vec<f32>,
    distances: Vec<u32>,
    mins: Vec<usize>,
    maxs: Vec<usize>,
    previous_pitch: Option<f32>,
    confidence: u32,
}

impl DywaEstimator {
    pub fn new(sample_rate: u32, range: PitchRange) -> Self {
        Self {
            sample_rate: sample_rate as f32,
            quantizer: SemitoneQuantizer::new(range),
            samples: Vec::new(),
            distances: Vec::new(),
            mins: Vec::new(),
            maxs: Vec::new(),
            previous_pitch: None,
            confidence: 0,
        }
    }

    /// Raw wavelet estimate for one window, without post-processing.
    pub fn compute_wavelet_pitch(&mut self, window: &[f32]) -> Option<f32> {
        let count = floor_power_of_two(window.len());
        if count < 2 {
            return None;
        }
        self.samples.clear();
        self.samples.extend_from_slice(&window[..count]);
        self.distances.clear();
        self.distances.resize(count, 0);

        let dc = self.samples.iter().sum::<f32>() / count as f32;
        let (min_value, max_value) = self
            .samples
            .iter()
            .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &s| {
                (lo.min(s), hi.max(s))
            });
        let amplitude_max = (max_value - dc).max(-(min_value - dc));
        let amplitude_threshold = amplitude_max * MAXIMA_THRESHOLD_RATIO;

        let mut current_len = count;
        let mut previous_mode_distance: Option<f32> = None;

        for level in 0..MAX_LEVELS {
            let delta = (self.sample_rate / (2f32.powi(level as i32) * MAX_FREQUENCY_HZ)) as usize;
            if current_len < 2 {
                return None;
            }

            self.find_extrema(current_len, dc, amplitude_threshold, delta);
            if self.mins.is_empty() && self.maxs.is_empty() {
                return None;
            }

            let mode_distance = self.mode_distance(current_len, delta)?;

            if let Some(previous) = previous_mode_distance {
                if (mode_distance * 2.0 - previous).abs() <= 2.0 * delta as f32 {
                    let scale = 2f32.powi(level as i32 - 1);
                    return Some(self.sample_rate / (scale * previous));
                }
            }
            previous_mode_distance = Some(mode_distance);

            for i in 0..current_len / 2 {
                self.samples[i] = (self.samples[2 * i] + self.samples[2 * i + 1]) / 2.0;
            }
            current_len /= 2;
        }

        None
    }

    /// Collect extremum indices. A minimum is searched after an upward zero
    /// crossing and a maximum after a downward one.
    fn find_extrema(&mut self, len: usize, dc: f32, threshold: f32, delta: usize) {
        self.mins.clear();
        self.maxs.clear();

        let mut previous_dv: Option<f32> = None;
        let mut find_min = false;
        let mut find_max = false;
        let mut last_min: Option<usize> = None;
        let mut last_max: Option<usize> = None;

        for i in 2..len {
            let si = self.samples[i] - dc;
            let si1 = self.samples[i - 1] - dc;

            if si1 <= 0.0 && si > 0.0 {
                find_min = true;
            }
            if si1 >= 0.0 && si < 0.0 {
                find_max = true;
            }

            let dv = si - si1;
            if let Some(pdv) = previous_dv {
                let far_enough = |last: Option<usize>| last.map_or(true, |l| i > l + delta);

                if find_min
                    && pdv < 0.0
                    && dv >= 0.0
                    && si1.abs() >= threshold
                    && far_enough(last_min)
                {
                    self.mins.push(i);
                    last_min = Some(i);
                    find_min = false;
                }
                if find_max
                    && pdv > 0.0
                    && dv <= 0.0
                    && si1.abs() >= threshold
                    && far_enough(last_max)
                {
                    self.maxs.push(i);
                    last_max = Some(i);
                    find_max = false;
                }
            }
            previous_dv = Some(dv);
        }
    }

    /// Dominant extremum distance at the current level.
    fn mode_distance(&mut self, len: usize, delta: usize) -> Option<f32> {
        let distances = &mut self.distances[..len];
        distances.fill(0);

        for extrema in [&self.mins, &self.maxs] {
            for i in 0..extrema.len() {
                for j in 1..DIFFERENCE_LEVELS {
                    if let Some(&other) = extrema.get(i + j) {
                        let d = other.abs_diff(extrema[i]);
                        if d < len {
                            distances[d] += 1;
                        }
                    }
                }
            }
        }

        let window_sum = |center: usize| -> u32 {
            let lo = center.saturating_sub(delta);
            let hi = (center + delta).min(len - 1);
            distances[lo..=hi].iter().sum()
        };

        let mut best_distance = 0usize;
        let mut best_value: Option<u32> = None;
        for i in 0..len {
            let summed = window_sum(i);
            match best_value {
                Some(value) if summed == value => {
                    // Prefer the doubled distance on a tie.
                    if i == 2 * best_distance {
                        best_distance = i;
                    }
                }
                Some(value) if summed < value => {}
                _ => {
                    best_value = Some(summed);
                    best_distance = i;
                }
            }
        }

        let lo = best_distance.saturating_sub(delta);
        let hi = (best_distance + delta).min(len - 1);
        let (weighted, count) = (lo..=hi).fold((0.0f32, 0u32), |(w, n), d| {
            let hits = distances[d];
            (w + d as f32 * hits as f32, n + hits)
        });

        if count == 0 {
            return None;
        }
        Some(weighted / count as f32)
    }

    /// Smooth a raw wavelet estimate against the tracked pitch.
    fn post_process(&mut self, pitch: Option<f32>) -> Option<f32> {
        let Some(pitch) = pitch.filter(|p| p.is_finite() && *p > 0.0) else {
            if self.previous_pitch.is_some() {
                if self.confidence >= 1 {
                    self.confidence -= 1;
                    return self.previous_pitch;
                }
                self.previous_pitch = None;
            }
            self.confidence = 0;
            return None;
        };

        let Some(previous) = self.previous_pitch else {
            self.previous_pitch = Some(pitch);
            self.confidence = 1;
            return Some(pitch);
        };

        let relative_error = |target: f32| (previous - target).abs() / target;

        if relative_error(pitch) < ACCEPTED_ERROR {
            self.previous_pitch = Some(pitch);
            self.confidence = (self.confidence + 1).min(MAX_CONFIDENCE);
            Some(pitch)
        } else if self.confidence >= OCTAVE_CONFIDENCE && relative_error(2.0 * pitch) < ACCEPTED_ERROR {
            self.previous_pitch = Some(2.0 * pitch);
            Some(2.0 * pitch)
        } else if self.confidence >= OCTAVE_CONFIDENCE && relative_error(0.5 * pitch) < ACCEPTED_ERROR {
            self.previous_pitch = Some(0.5 * pitch);
            Some(0.5 * pitch)
        } else if self.confidence >= 1 {
            self.confidence -= 1;
            Some(previous)
        } else {
            self.previous_pitch = Some(pitch);
            self.confidence = 1;
            Some(pitch)
        }
    }

    /// Estimate the frequency of `window` with post-processing applied.
    pub fn estimate_frequency(&mut self, window: &[f32]) -> Option<FrequencyEstimate> {
        let raw = self.compute_wavelet_pitch(window);
        let frequency_hz = self.post_process(raw)?;
        Some(FrequencyEstimate {
            frequency_hz,
            confidence: self.confidence as f32 / MAX_CONFIDENCE as f32,
        })
    }
}

impl PitchEstimator for DywaEstimator {
    fn estimate(&mut self, window: &[f32]) -> Option<PitchEvent> {
        let estimate = self.estimate_frequency(window)?;
        Some(PitchEvent {
            semitone: self.quantizer.frequency_to_semitone(estimate.frequency_hz),
            frequency_hz: Some(estimate.frequency_hz),
            confidence: Some(estimate.confidence),
        })
    }

    fn reset(&mut self) {
        self.previous_pitch = None;
        self.confidence = 0;
    }

    fn algorithm(&self) -> PitchAlgorithm {
        PitchAlgorithm::Dywa
    }
}
