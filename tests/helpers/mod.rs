//! Shared test utilities for cantor integration tests.
//!
//! Tolerance levels live in [`tolerances`]:
//! - `FLOAT_EPSILON` (1e-6): exact operations
//! - `SEMITONE_TOLERANCE` (1): detected vs. sung semitone
//! - `FREQUENCY_RATIO_EPSILON` (0.02): detected vs. generated frequency

#![allow(dead_code)]

pub mod tolerances;

use std::f64::consts::PI;
use std::sync::Arc;

use cantor::{Note, NoteKind, PitchRange, Sentence, Song};

pub const SAMPLE_RATE: u32 = 44100;

/// Samples per 10 ms capture block.
pub const BLOCK_LEN: usize = SAMPLE_RATE as usize / 100;

/// Generate a sine wave at the given frequency.
pub fn generate_sine(frequency: f64, sample_rate: f64, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate;
            (0.8 * (2.0 * PI * frequency * t).sin()) as f32
        })
        .collect()
}

/// Generate silence (all zeros).
pub fn generate_silence(num_samples: usize) -> Vec<f32> {
    vec![0.0; num_samples]
}

/// Generate white noise with a deterministic seed.
pub fn generate_noise(num_samples: usize, seed: u64) -> Vec<f32> {
    let mut state = seed;
    (0..num_samples)
        .map(|_| {
            // Simple LCG for reproducible noise
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            ((state >> 33) as f32 / (1u64 << 31) as f32) * 2.0 - 1.0
        })
        .collect()
}

/// Calculate peak amplitude.
pub fn peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0, f32::max)
}

/// Phase-continuous sine stream cut into capture blocks.
pub struct SineBlocks {
    frequency: f64,
    phase: f64,
}

impl SineBlocks {
    pub fn semitone(semitone: i32) -> Self {
        Self {
            frequency: PitchRange::default().frequency_of(semitone) as f64,
            phase: 0.0,
        }
    }

    pub fn next_block(&mut self) -> Vec<f32> {
        let step = 2.0 * PI * self.frequency / SAMPLE_RATE as f64;
        (0..BLOCK_LEN)
            .map(|_| {
                let sample = (0.8 * self.phase.sin()) as f32;
                self.phase = (self.phase + step) % (2.0 * PI);
                sample
            })
            .collect()
    }
}

/// Build a song at 120 BPM without gap; each sentence is a list of
/// `(start, end, semitone, kind)` notes and breaks after its last note.
pub fn song(sentences: &[&[(i32, i32, i32, NoteKind)]]) -> Arc<Song> {
    let sentences = sentences
        .iter()
        .map(|notes| {
            let notes: Vec<Note> = notes
                .iter()
                .map(|&(s, e, t, k)| Note::new(s, e, t, k).unwrap())
                .collect();
            let line_break = notes.last().unwrap().end_beat;
            Sentence::new(notes, line_break).unwrap()
        })
        .collect();
    Arc::new(Song::new(120.0, 0.0, sentences).unwrap())
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}
