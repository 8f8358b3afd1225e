//! Offline pitch tracking on a background thread.
//!
//! [`PitchTrackJob::spawn`] slides a window over a recorded take and runs the
//! device's configured detector on each frame. Progress is reported over a
//! crossbeam channel and the job can be cancelled between frames.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use cantor_core::{DeviceConfig, PitchRange};
use crossbeam_channel::{Receiver, Sender};
use tracing::{debug, info};

use crate::estimator::{PitchDetector, PitchEvent, MIN_WINDOW_SAMPLES};
use crate::{Error, Result};

/// Frames between two `Progress` messages.
const PROGRESS_INTERVAL: usize = 32;

/// Progress of a running [`PitchTrackJob`].
#[derive(Debug, Clone, PartialEq)]
pub enum TrackProgress {
    Started { total_frames: usize },
    Progress { frame: usize, total_frames: usize },
    Finished { voiced_frames: usize },
    Cancelled { frame: usize },
}

/// Result of an offline pitch tracking run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct PitchTrack {
    pub sample_rate: u32,
    pub window_size: usize,
    pub hop: usize,
    /// One entry per frame; `None` where no pitch was found.
    pub frames: Vec<Option<PitchEvent>>,
}

impl PitchTrack {
    /// Start time of `frame` in milliseconds from the start of the take.
    pub fn frame_time_ms(&self, frame: usize) -> f64 {
        (frame * self.hop) as f64 * 1000.0 / self.sample_rate as f64
    }

    pub fn voiced_frames(&self) -> usize {
        self.frames.iter().filter(|f| f.is_some()).count()
    }
}

/// Handle to a background pitch tracking run.
pub struct PitchTrackJob {
    progress: Receiver<TrackProgress>,
    cancel: Arc<AtomicBool>,
    handle: JoinHandle<Option<PitchTrack>>,
}

impl PitchTrackJob {
    /// Start tracking `samples` with the detector described by `config`.
    ///
    /// # Arguments
    /// * `samples` - Mono take, already at `config.sample_rate`
    /// * `window_size` - Analysis window per frame (at least 256)
    /// * `hop` - Samples between frame starts (non-zero)
    pub fn spawn(
        samples: Arc<[f32]>,
        config: &DeviceConfig,
        range: PitchRange,
        window_size: usize,
        hop: usize,
    ) -> Result<Self> {
        if window_size < MIN_WINDOW_SAMPLES || hop == 0 {
            return Err(Error::InvalidWindow { window_size, hop });
        }
        let mut detector = PitchDetector::from_config(config, range)?;
        let sample_rate = config.sample_rate;

        let (tx, rx) = crossbeam_channel::unbounded();
        let cancel = Arc::new(AtomicBool::new(false));
        let cancel_flag = Arc::clone(&cancel);

        let handle = thread::spawn(move || {
            let frames =
                track_frames(&samples, &mut detector, window_size, hop, &cancel_flag, &tx)?;
            Some(PitchTrack {
                sample_rate,
                window_size,
                hop,
                frames,
            })
        });

        Ok(Self {
            progress: rx,
            cancel,
            handle,
        })
    }

    pub fn progress(&self) -> &Receiver<TrackProgress> {
        &self.progress
    }

    /// Ask the worker to stop after the current frame.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the worker and return the finished track.
    pub fn join(self) -> Result<PitchTrack> {
        match self.handle.join() {
            Ok(Some(track)) => Ok(track),
            Ok(None) => Err(Error::Cancelled),
            Err(_) => Err(Error::WorkerPanicked),
        }
    }
}

fn track_frames(
    samples: &[f32],
    detector: &mut PitchDetector,
    window_size: usize,
    hop: usize,
    cancel: &AtomicBool,
    progress: &Sender<TrackProgress>,
) -> Option<Vec<Option<PitchEvent>>> {
    let total_frames = if samples.len() < window_size {
        0
    } else {
        (samples.len() - window_size) / hop + 1
    };
    // The receiver may be dropped; tracking continues regardless.
    let _ = progress.send(TrackProgress::Started { total_frames });
    debug!(total_frames, window_size, hop, "pitch tracking started");

    let mut frames = Vec::with_capacity(total_frames);
    for frame in 0..total_frames {
        if cancel.load(Ordering::Acquire) {
            info!(frame, "pitch tracking cancelled");
            let _ = progress.send(TrackProgress::Cancelled { frame });
            return None;
        }

        let start = frame * hop;
        frames.push(detector.detect(&samples[start..start + window_size]));

        if (frame + 1) % PROGRESS_INTERVAL == 0 {
            let _ = progress.send(TrackProgress::Progress {
                frame: frame + 1,
                total_frames,
            });
        }
    }

    let voiced_frames = frames.iter().filter(|f| f.is_some()).count();
    let _ = progress.send(TrackProgress::Finished { voiced_frames });
    debug!(voiced_frames, total_frames, "pitch tracking finished");
    Some(frames)
}
