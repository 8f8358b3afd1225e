//! Small helpers shared by the estimators.

/// Largest power of two not greater than `n` (0 for 0).
#[inline]
pub fn floor_power_of_two(n: usize) -> usize {
    if n == 0 {
        0
    } else {
        1 << (usize::BITS - 1 - n.leading_zeros())
    }
}

#[inline]
pub fn is_power_of_two(n: usize) -> bool {
    n != 0 && n & (n - 1) == 0
}

/// Peak absolute amplitude.
#[inline]
pub fn peak_amplitude(window: &[f32]) -> f32 {
    window.iter().fold(0.0f32, |peak, s| peak.max(s.abs()))
}

/// Median of a small set (upper median for even sizes).
pub fn median(values: impl IntoIterator<Item = i32>) -> Option<i32> {
    let mut sorted: Vec<i32> = values.into_iter().collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_unstable();
    Some(sorted[sorted.len() / 2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_power_of_two() {
        assert_eq!(floor_power_of_two(0), 0);
        assert_eq!(floor_power_of_two(1), 1);
        assert_eq!(floor_power_of_two(3), 2);
        assert_eq!(floor_power_of_two(1024), 1024);
        assert_eq!(floor_power_of_two(2047), 1024);
        assert!(is_power_of_two(4096));
        assert!(!is_power_of_two(0));
        assert!(!is_power_of_two(96));
    }

    #[test]
    fn test_peak_amplitude() {
        assert_eq!(peak_amplitude(&[]), 0.0);
        assert_eq!(peak_amplitude(&[0.1, -0.7, 0.3]), 0.7);
    }

    #[test]
    fn test_median() {
        assert_eq!(median([5, 1, 3]), Some(3));
        assert_eq!(median([60, 72, 60, 61]), Some(61));
        assert_eq!(median(Vec::new()), None);
    }
}
