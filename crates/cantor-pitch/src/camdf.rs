//! Circular average magnitude difference (CAMDF) over semitone delays.
//!
//! Instead of scanning every lag, only the lag of each singable semitone is
//! evaluated. The semitone with the smallest circular difference wins and the
//! reported value is the median of the last few winners.
//!
//! Delays stay fractional (the shifted signal is linearly interpolated) so a
//! rounded short delay cannot alias onto a multiple of a longer one. Only
//! delays that fit [`MIN_PERIODS`] times into the window are candidates: for
//! longer periods the wrap-around seam outweighs the difference at the true
//! delay and the shortest delay wins instead. At 44.1 kHz this puts the
//! lowest detectable semitone at 41 for 2048-sample windows and 53 for 1024.

use std::collections::VecDeque;

use cantor_core::{PitchAlgorithm, PitchRange};

use crate::estimator::{PitchEstimator, PitchEvent};
use crate::window::{floor_power_of_two, median};

/// Number of recent winners the median is taken over.
pub const HISTORY_LEN: usize = 5;

/// Whole periods a candidate delay must fit into the analysis window.
pub const MIN_PERIODS: usize = 4;

#[derive(Debug, Clone)]
pub struct CamdfEstimator {
    range: PitchRange,
    /// Delay in samples per semitone, ascending from `range.min_semitone`.
    delays: Vec<f32>,
    history: VecDeque<i32>,
}

impl CamdfEstimator {
    pub fn new(sample_rate: u32, range: PitchRange) -> Self {
        let delays = (range.min_semitone..=range.max_semitone)
            .map(|semitone| sample_rate as f32 / range.frequency_of(semitone))
            .collect();
        Self {
            range,
            delays,
            history: VecDeque::with_capacity(HISTORY_LEN),
        }
    }

    pub fn delays(&self) -> &[f32] {
        &self.delays
    }

    /// Lowest semitone evaluated for a window of `window_len` samples.
    pub fn lowest_supported_semitone(&self, window_len: usize) -> Option<i32> {
        let max_delay = max_delay(floor_power_of_two(window_len));
        self.delays
            .iter()
            .position(|&tau| tau <= max_delay)
            .map(|index| self.range.min_semitone + index as i32)
    }

    /// Semitone with the smallest circular difference, before median smoothing.
    ///
    /// Candidates are scanned in ascending order and the first minimum is kept.
    pub fn raw_semitone(&self, window: &[f32]) -> Option<i32> {
        let len = floor_power_of_two(window.len());
        if len == 0 {
            return None;
        }
        let window = &window[..len];
        let max_delay = max_delay(len);

        let mut best: Option<(usize, f32)> = None;
        for (index, &tau) in self.delays.iter().enumerate() {
            if tau > max_delay {
                continue;
            }
            let difference = circular_difference(window, tau);
            if best.map_or(true, |(_, d)| difference < d) {
                best = Some((index, difference));
            }
        }

        best.map(|(index, _)| self.range.min_semitone + index as i32)
    }
}

#[inline]
fn max_delay(window_len: usize) -> f32 {
    (window_len / MIN_PERIODS) as f32
}

/// D(τ) = (1/L) · Σ |x[(i+τ) mod L] - x[i]|, with x between samples
/// linearly interpolated.
fn circular_difference(window: &[f32], tau: f32) -> f32 {
    let len = window.len();
    let shift = tau.floor() as usize % len;
    let fraction = tau.fract();
    let (head, tail) = window.split_at(shift);
    let shifted = tail.iter().chain(head);
    let next = shifted.clone().cycle().skip(1);

    let sum: f32 = shifted
        .zip(next)
        .zip(window)
        .map(|((&a, &b), sample)| (a + (b - a) * fraction - sample).abs())
        .sum();
    sum / len as f32
}

impl PitchEstimator for CamdfEstimator {
    fn estimate(&mut self, window: &[f32]) -> Option<PitchEvent> {
        let semitone = self.raw_semitone(window)?;
        if self.history.len() == HISTORY_LEN {
            self.history.pop_front();
        }
        self.history.push_back(semitone);

        Some(PitchEvent {
            semitone: median(self.history.iter().copied())?,
            frequency_hz: None,
            confidence: None,
        })
    }

    fn reset(&mut self) {
        self.history.clear();
    }

    fn algorithm(&self) -> PitchAlgorithm {
        PitchAlgorithm::Camdf
    }
}
