//! Fixed-size circular store of the most recent captured mono samples.
//!
//! Storage is circular (a write cursor wraps around the backing array), but
//! reads use *chronological* indices: index 0 is the oldest retained sample
//! and index `len() - 1` is always the most recently captured one. Beat
//! windows computed by the judge address the buffer in that space.

use core::ops::Range;

/// Circular buffer of mono `f32` samples in [-1, 1].
///
/// Single writer (the capture collaborator), single reader (the analysis
/// scheduler) on the same tick; no interior locking.
#[derive(Debug, Clone)]
pub struct AudioRingBuffer {
    samples: Vec<f32>,
    /// Next physical slot to overwrite (also the oldest sample once full).
    write_pos: usize,
    total_written: u64,
    amplification: f32,
}

impl AudioRingBuffer {
    /// Create a zero-filled buffer holding `len` samples.
    ///
    /// # Panics
    /// Panics if `len` is zero.
    pub fn new(len: usize) -> Self {
        assert!(len > 0, "ring buffer length must be greater than 0");
        Self {
            samples: vec![0.0; len],
            write_pos: 0,
            total_written: 0,
            amplification: 1.0,
        }
    }

    /// Create a buffer holding one second of audio.
    pub fn for_sample_rate(sample_rate: u32) -> Self {
        Self::new(sample_rate.max(1) as usize)
    }

    /// Set the gain applied to incoming samples. Non-positive or non-finite
    /// values reset the gain to unity.
    pub fn set_amplification(&mut self, amplification: f32) {
        self.amplification = if amplification.is_finite() && amplification > 0.0 {
            amplification
        } else {
            1.0
        };
    }

    pub fn amplification(&self) -> f32 {
        self.amplification
    }

    /// Append the newest block of samples, overwriting the oldest region.
    ///
    /// Gain is applied before storage and the result clamped to [-1, 1].
    /// A block longer than the buffer only keeps its newest `len()` samples.
    pub fn write(&mut self, block: &[f32]) {
        let len = self.samples.len();
        let skip = block.len().saturating_sub(len);
        let gain = self.amplification;

        for &sample in &block[skip..] {
            self.samples[self.write_pos] = (sample * gain).clamp(-1.0, 1.0);
            self.write_pos += 1;
            if self.write_pos == len {
                self.write_pos = 0;
            }
        }

        // Skipped samples still count as captured.
        self.total_written += block.len() as u64;
    }

    /// Number of samples retained.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Total number of samples ever written; advances on every non-empty write.
    #[inline]
    pub fn total_written(&self) -> u64 {
        self.total_written
    }

    /// Backing storage in physical (circular) order.
    pub fn as_raw_slice(&self) -> &[f32] {
        &self.samples
    }

    /// Sample at a chronological index (0 = oldest, `len() - 1` = newest).
    /// Out-of-range indices are clamped.
    #[inline]
    pub fn sample(&self, index: usize) -> f32 {
        let len = self.samples.len();
        let index = index.min(len - 1);
        self.samples[(self.write_pos + index) % len]
    }

    /// Borrow a chronological index range, clamped to `[0, len())`.
    ///
    /// The result is split in at most two contiguous pieces because the
    /// range may straddle the physical wrap point.
    pub fn read(&self, range: Range<usize>) -> RingSlice<'_> {
        let len = self.samples.len();
        let start = range.start.min(len);
        let end = range.end.clamp(start, len);
        let count = end - start;
        if count == 0 {
            return RingSlice { head: &[], tail: &[] };
        }

        let physical_start = (self.write_pos + start) % len;
        let first_len = count.min(len - physical_start);
        RingSlice {
            head: &self.samples[physical_start..physical_start + first_len],
            tail: &self.samples[..count - first_len],
        }
    }

    /// Reset to silence.
    pub fn clear(&mut self) {
        self.samples.fill(0.0);
        self.write_pos = 0;
        self.total_written = 0;
    }
}

/// Borrowed chronological range of an [`AudioRingBuffer`].
#[derive(Debug, Clone, Copy)]
pub struct RingSlice<'a> {
    head: &'a [f32],
    tail: &'a [f32],
}

impl<'a> RingSlice<'a> {
    #[inline]
    pub fn len(&self) -> usize {
        self.head.len() + self.tail.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The two contiguous pieces, oldest first.
    pub fn as_slices(&self) -> (&'a [f32], &'a [f32]) {
        (self.head, self.tail)
    }

    pub fn iter(&self) -> impl Iterator<Item = f32> + 'a {
        self.head.iter().chain(self.tail.iter()).copied()
    }

    /// Copy into `out`, replacing its contents. Reuses the allocation.
    pub fn copy_into(&self, out: &mut Vec<f32>) {
        out.clear();
        out.extend_from_slice(self.head);
        out.extend_from_slice(self.tail);
    }

    pub fn to_vec(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.len());
        self.copy_into(&mut out);
        out
    }
}
