//! Frequency -> semitone quantization.

use cantor_core::PitchRange;

/// Lookup table of equal-tempered center frequencies over a singable range.
#[derive(Debug, Clone)]
pub struct SemitoneQuantizer {
    range: PitchRange,
    frequencies: Vec<f32>,
}

impl SemitoneQuantizer {
    pub fn new(range: PitchRange) -> Self {
        let frequencies = (range.min_semitone..=range.max_semitone)
            .map(|semitone| range.frequency_of(semitone))
            .collect();
        Self { range, frequencies }
    }

    pub fn range(&self) -> &PitchRange {
        &self.range
    }

    /// Center frequencies, ascending from `range().min_semitone`.
    pub fn frequencies(&self) -> &[f32] {
        &self.frequencies
    }

    pub fn semitone_frequency(&self, semitone: i32) -> Option<f32> {
        if !self.range.contains(semitone) {
            return None;
        }
        self.frequencies
            .get((semitone - self.range.min_semitone) as usize)
            .copied()
    }

    /// Semitone whose center frequency is nearest `frequency`.
    ///
    /// Scans ascending and keeps the first minimum, so an exact tie between
    /// two neighbours resolves to the lower semitone.
    pub fn frequency_to_semitone(&self, frequency: f32) -> i32 {
        let mut best_index = 0;
        let mut best_distance = f32::INFINITY;
        for (index, &center) in self.frequencies.iter().enumerate() {
            let distance = (center - frequency).abs();
            if distance < best_distance {
                best_distance = distance;
                best_index = index;
            }
        }
        self.range.min_semitone + best_index as i32
    }
}

impl Default for SemitoneQuantizer {
    fn default() -> Self {
        Self::new(PitchRange::default())
    }
}
