//! Tolerance rounding and the joker rule.

use cantor_core::{Note, PitchRange};

/// Result of rounding a detected semitone toward a target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundedPitch {
    pub semitone: i32,
    /// The detected semitone was outside the singable range and was given
    /// the benefit of the doubt.
    pub pitch_failure: bool,
}

/// Distance between two semitones ignoring octaves (0..=6).
#[inline]
pub fn octave_distance(a: i32, b: i32) -> i32 {
    let d = (a - b).rem_euclid(12);
    d.min(12 - d)
}

/// Same pitch class.
#[inline]
pub fn is_correct(rounded: i32, target: i32) -> bool {
    rounded.rem_euclid(12) == target.rem_euclid(12)
}

/// Round `raw` toward `target`.
///
/// - no target: unchanged
/// - target accepts any pitch: snapped
/// - `raw` outside `range`: snapped, flagged as a pitch failure
/// - octave-folded distance within `tolerance`: snapped
pub fn round_to_target(raw: i32, target: Option<&Note>, range: &PitchRange, tolerance: i32) -> RoundedPitch {
    let Some(note) = target else {
        return RoundedPitch {
            semitone: raw,
            pitch_failure: false,
        };
    };

    if note.kind.accepts_any_pitch() {
        return RoundedPitch {
            semitone: note.semitone,
            pitch_failure: false,
        };
    }

    if !range.contains(raw) {
        return RoundedPitch {
            semitone: note.semitone,
            pitch_failure: true,
        };
    }

    let semitone = if octave_distance(raw, note.semitone) <= tolerance {
        note.semitone
    } else {
        raw
    };
    RoundedPitch {
        semitone,
        pitch_failure: false,
    }
}

/// One-shot forgiveness token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Joker {
    available: bool,
    used: u32,
}

impl Joker {
    /// Apply the rule to a beat judged at a note. Returns true when the joker
    /// was spent to turn an incorrect beat into a correct one.
    pub fn judge(&mut self, correct: bool, pitch_failure: bool) -> bool {
        if correct {
            if !pitch_failure {
                self.available = true;
            }
            false
        } else if self.available {
            self.available = false;
            self.used += 1;
            true
        } else {
            false
        }
    }

    /// Silence breaks the streak.
    pub fn clear(&mut self) {
        self.available = false;
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn used_count(&self) -> u32 {
        self.used
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cantor_core::NoteKind;

    fn note(semitone: i32, kind: NoteKind) -> Note {
        Note::new(0, 4, semitone, kind).unwrap()
    }

    #[test]
    fn test_octave_distance() {
        assert_eq!(octave_distance(60, 60), 0);
        assert_eq!(octave_distance(72, 60), 0);
        assert_eq!(octave_distance(61, 60), 1);
        assert_eq!(octave_distance(59, 60), 1);
        assert_eq!(octave_distance(71, 60), 1);
        assert_eq!(octave_distance(66, 60), 6);
    }

    #[test]
    fn test_tolerance_snaps() {
        let range = PitchRange::default();
        let target = note(60, NoteKind::Normal);
        assert_eq!(round_to_target(61, Some(&target), &range, 1).semitone, 60);
        assert_eq!(round_to_target(62, Some(&target), &range, 1).semitone, 62);
        assert_eq!(round_to_target(62, Some(&target), &range, 2).semitone, 60);
        assert_eq!(round_to_target(48, Some(&target), &range, 0).semitone, 60);
        assert_eq!(round_to_target(61, Some(&target), &range, 0).semitone, 61);
    }

    #[test]
    fn test_any_pitch_notes_snap() {
        let range = PitchRange::default();
        for kind in [NoteKind::Freestyle, NoteKind::Rap, NoteKind::RapGolden] {
            let rounded = round_to_target(66, Some(&note(60, kind)), &range, 0);
            assert_eq!(rounded.semitone, 60);
            assert!(!rounded.pitch_failure);
        }
    }

    #[test]
    fn test_out_of_range_is_pitch_failure() {
        let range = PitchRange::default();
        let rounded = round_to_target(20, Some(&note(60, NoteKind::Normal)), &range, 0);
        assert_eq!(rounded.semitone, 60);
        assert!(rounded.pitch_failure);
    }

    #[test]
    fn test_no_target_is_unchanged() {
        let rounded = round_to_target(64, None, &PitchRange::default(), 2);
        assert_eq!(rounded.semitone, 64);
    }

    #[test]
    fn test_joker_round_trip() {
        let mut joker = Joker::default();
        assert!(!joker.judge(true, false));
        assert!(joker.judge(false, false));
        assert!(!joker.judge(false, false));
        assert_eq!(joker.used_count(), 1);

        assert!(!joker.judge(true, false));
        assert!(joker.judge(false, false));
        assert_eq!(joker.used_count(), 2);
    }

    #[test]
    fn test_pitch_failure_earns_nothing() {
        let mut joker = Joker::default();
        joker.judge(true, true);
        assert!(!joker.is_available());
    }

    #[test]
    fn test_silence_clears_joker() {
        let mut joker = Joker::default();
        joker.judge(true, false);
        joker.clear();
        assert!(!joker.judge(false, false));
    }

    #[test]
    fn test_only_one_joker_banked() {
        let mut joker = Joker::default();
        joker.judge(true, false);
        joker.judge(true, false);
        assert!(joker.judge(false, false));
        assert!(!joker.judge(false, false));
    }
}
