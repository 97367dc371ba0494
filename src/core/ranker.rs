use crate::models::{PreferenceWeights, SafetyMode, ScoredListing};
use std::cmp::Ordering;

/// Scale applied to the crime dimension of the distance
pub const CRIME_DIMENSION_SCALE: f64 = 1.0;

/// Scale applied to the combined-tradeoff dimension of the distance
pub const TRADEOFF_DIMENSION_SCALE: f64 = 1.0;

/// Position of a listing (or the query) in feature space
///
/// `crime` is present exactly when the safety mode includes the crime dimension.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    pub transit: f64,
    pub rent: f64,
    pub tradeoff: f64,
    pub crime: Option<f64>,
}

impl FeatureVector {
    pub fn for_listing(
        mode: SafetyMode,
        transit: f64,
        rent: f64,
        tradeoff: f64,
        crime_exposure: Option<f64>,
    ) -> Self {
        Self {
            transit,
            rent,
            tradeoff,
            crime: crime_exposure.filter(|_| mode.includes_crime()),
        }
    }

    /// The query sits at its own normalized transit and rent, the baseline
    /// tradeoff, and the mode's crime baseline
    pub fn for_query(mode: SafetyMode, transit: f64, rent: f64, baseline_tradeoff: f64) -> Self {
        Self {
            transit,
            rent,
            tradeoff: baseline_tradeoff,
            crime: mode.crime_baseline(),
        }
    }

    pub fn dimensions(&self) -> usize {
        if self.crime.is_some() { 4 } else { 3 }
    }
}

/// Per-dimension multipliers applied to the query/listing difference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DimensionScales {
    pub transit: f64,
    pub rent: f64,
    pub tradeoff: f64,
    pub crime: f64,
}

impl DimensionScales {
    pub fn from_weights(weights: &PreferenceWeights) -> Self {
        Self {
            transit: weights.location,
            rent: weights.rent,
            tradeoff: TRADEOFF_DIMENSION_SCALE,
            crime: CRIME_DIMENSION_SCALE,
        }
    }
}

impl Default for DimensionScales {
    fn default() -> Self {
        Self::from_weights(&PreferenceWeights::default())
    }
}

/// Euclidean norm of the scaled difference between two feature vectors
///
/// The crime dimension only contributes when both vectors carry it. Terms are
/// combined with `hypot`, so the norm stays finite whenever every term is.
#[inline]
pub fn weighted_distance(query: &FeatureVector, listing: &FeatureVector, scales: &DimensionScales) -> f64 {
    let transit = (query.transit - listing.transit) * scales.transit;
    let rent = (query.rent - listing.rent) * scales.rent;
    let tradeoff = (query.tradeoff - listing.tradeoff) * scales.tradeoff;
    let crime = match (query.crime, listing.crime) {
        (Some(q), Some(l)) => (q - l) * scales.crime,
        _ => 0.0,
    };

    transit.hypot(rent).hypot(tradeoff).hypot(crime)
}

/// `1 / (1 + distance)`, in (0, 1] for any non-negative distance
#[inline]
pub fn similarity(distance: f64) -> f64 {
    1.0 / (1.0 + distance)
}

/// Sort by similarity, highest first
///
/// The sort is stable: listings with equal scores keep their input order.
pub fn rank(scored: &mut [ScoredListing]) {
    scored.sort_by(|a, b| {
        b.similarity_score
            .partial_cmp(&a.similarity_score)
            .unwrap_or(Ordering::Equal)
    });
}
