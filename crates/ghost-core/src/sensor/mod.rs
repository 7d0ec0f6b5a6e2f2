//! Fixed sensor model relating clue colours to distance from the target.
//!
//! The same bucketing (`0 | 1 | 2 | 3 | 4 | >=5`) is used for drawing clues
//! during play and for scoring them in belief updates.

use crate::model::color::ClueColor;
use crate::model::distance::DistanceBucket;
use crate::random::RandomSource;

/// `P(colour | bucket)`; rows are indexed by [`DistanceBucket::index`] and
/// columns by [`ClueColor::index`].
pub const OBSERVATION_TABLE: [[f64; ClueColor::COUNT]; DistanceBucket::COUNT] = [
    [0.80, 0.10, 0.05, 0.05],
    [0.15, 0.65, 0.15, 0.05],
    [0.10, 0.70, 0.15, 0.05],
    [0.05, 0.15, 0.65, 0.15],
    [0.05, 0.05, 0.70, 0.20],
    [0.02, 0.08, 0.20, 0.70],
];

/// Scores an observed colour against a hypothesised distance.
pub trait Likelihood {
    fn likelihood(&self, color: ClueColor, distance: usize) -> f64;
}

/// The game's conditional colour distribution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObservationModel;

impl ObservationModel {
    pub const fn standard() -> Self {
        Self
    }

    pub const fn bucket(distance: usize) -> DistanceBucket {
        DistanceBucket::from_distance(distance)
    }

    pub fn distribution(&self, bucket: DistanceBucket) -> &'static [f64; ClueColor::COUNT] {
        &OBSERVATION_TABLE[bucket.index()]
    }

    /// Draws a clue colour for `bucket` using one unit draw from `rng`.
    pub fn sample<S: RandomSource + ?Sized>(
        &self,
        bucket: DistanceBucket,
        rng: &mut S,
    ) -> ClueColor {
        self.sample_with_threshold(bucket, rng.next_unit())
    }

    /// Returns the first colour whose cumulative mass exceeds `threshold`.
    ///
    /// Residual mass left by rounding falls through to the last colour, so a
    /// colour is always returned.
    pub fn sample_with_threshold(&self, bucket: DistanceBucket, threshold: f64) -> ClueColor {
        let mut cumulative = 0.0;
        for (color, mass) in ClueColor::ALL.iter().zip(self.distribution(bucket)) {
            cumulative += mass;
            if threshold < cumulative {
                return *color;
            }
        }
        ClueColor::ALL[ClueColor::COUNT - 1]
    }

    pub fn likelihood_for_bucket(&self, color: ClueColor, bucket: DistanceBucket) -> f64 {
        OBSERVATION_TABLE
            .get(bucket.index())
            .and_then(|row| row.get(color.index()))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn likelihood(&self, color: ClueColor, distance: usize) -> f64 {
        self.likelihood_for_bucket(color, Self::bucket(distance))
    }
}

impl Likelihood for ObservationModel {
    fn likelihood(&self, color: ClueColor, distance: usize) -> f64 {
        ObservationModel::likelihood(self, color, distance)
    }
}
