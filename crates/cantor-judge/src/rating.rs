//! Sentence rating tiers.

/// Discrete grade given to a sung sentence, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub enum SentenceRating {
    Perfect,
    Great,
    Good,
    NotBad,
    Bad,
    ToneDeaf,
}

impl SentenceRating {
    pub const ALL: [SentenceRating; 6] = [
        SentenceRating::Perfect,
        SentenceRating::Great,
        SentenceRating::Good,
        SentenceRating::NotBad,
        SentenceRating::Bad,
        SentenceRating::ToneDeaf,
    ];

    /// Minimum correct fraction for this tier in the default table.
    pub fn default_threshold(self) -> f64 {
        match self {
            SentenceRating::Perfect => 0.95,
            SentenceRating::Great => 0.8,
            SentenceRating::Good => 0.6,
            SentenceRating::NotBad => 0.4,
            SentenceRating::Bad => 0.2,
            SentenceRating::ToneDeaf => 0.0,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SentenceRating::Perfect => "Perfect",
            SentenceRating::Great => "Great",
            SentenceRating::Good => "Good",
            SentenceRating::NotBad => "Not bad",
            SentenceRating::Bad => "Bad",
            SentenceRating::ToneDeaf => "Tone deaf",
        }
    }
}

impl core::fmt::Display for SentenceRating {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}

/// One row of the rating table.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(
    feature = "serialization",
    derive(serde::Serialize, serde::Deserialize)
)]
pub struct RatingTier {
    pub rating: SentenceRating,
    pub min_fraction: f64,
}

/// Default table, best tier first.
pub fn default_tiers() -> Vec<RatingTier> {
    SentenceRating::ALL
        .iter()
        .map(|&rating| RatingTier {
            rating,
            min_fraction: rating.default_threshold(),
        })
        .collect()
}

/// Highest tier whose threshold `fraction` reaches. Falls back to the last
/// tier of the table.
pub fn rate(fraction: f64, tiers: &[RatingTier]) -> SentenceRating {
    tiers
        .iter()
        .filter(|tier| fraction >= tier.min_fraction)
        .max_by(|a, b| a.min_fraction.total_cmp(&b.min_fraction))
        .or_else(|| tiers.iter().min_by(|a, b| a.min_fraction.total_cmp(&b.min_fraction)))
        .map_or(SentenceRating::ToneDeaf, |tier| tier.rating)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table() {
        let tiers = default_tiers();
        assert_eq!(rate(1.0, &tiers), SentenceRating::Perfect);
        assert_eq!(rate(0.95, &tiers), SentenceRating::Perfect);
        assert_eq!(rate(0.94, &tiers), SentenceRating::Great);
        assert_eq!(rate(0.6, &tiers), SentenceRating::Good);
        assert_eq!(rate(0.5, &tiers), SentenceRating::NotBad);
        assert_eq!(rate(0.2, &tiers), SentenceRating::Bad);
        assert_eq!(rate(0.0, &tiers), SentenceRating::ToneDeaf);
    }

    #[test]
    fn test_unsorted_table() {
        let tiers = [
            RatingTier {
                rating: SentenceRating::Bad,
                min_fraction: 0.0,
            },
            RatingTier {
                rating: SentenceRating::Perfect,
                min_fraction: 0.9,
            },
        ];
        assert_eq!(rate(0.92, &tiers), SentenceRating::Perfect);
        assert_eq!(rate(0.5, &tiers), SentenceRating::Bad);
    }

    #[test]
    fn test_below_every_tier_uses_lowest() {
        let tiers = [RatingTier {
            rating: SentenceRating::Good,
            min_fraction: 0.5,
        }];
        assert_eq!(rate(0.1, &tiers), SentenceRating::Good);
        assert_eq!(rate(0.1, &[]), SentenceRating::ToneDeaf);
    }

    #[test]
    fn test_display() {
        assert_eq!(SentenceRating::NotBad.to_string(), "Not bad");
    }
}
