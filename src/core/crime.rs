use crate::core::{error::EngineError, normalize::MinMaxRange};

/// Violent crime counts this many times as much as overall crime
pub const VIOLENT_CRIME_WEIGHT: f64 = 2.0;

/// Brings the [0, 1] exposure onto the range of the other feature dimensions
pub const CRIME_EXPOSURE_SCALE: f64 = 3.0;

/// Combines violent and overall crime rates into one exposure figure
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CrimeAggregator {
    violent: MinMaxRange,
    overall: MinMaxRange,
    aggregate: MinMaxRange,
}

impl CrimeAggregator {
    /// Fit the violent, overall and aggregated ranges over the dataset
    pub fn fit(violent: &[f64], overall: &[f64]) -> Result<Self, EngineError> {
        let violent_range = MinMaxRange::fit("violent crime rate", violent)?;
        let overall_range = MinMaxRange::fit("overall crime rate", overall)?;

        let aggregated: Vec<f64> = violent
            .iter()
            .zip(overall)
            .map(|(&v, &o)| weighted_sum(violent_range.scale(v), overall_range.scale(o)))
            .collect();
        let aggregate = MinMaxRange::fit("aggregated crime", &aggregated)?;

        Ok(Self {
            violent: violent_range,
            overall: overall_range,
            aggregate,
        })
    }

    /// `2 * normalized violent + normalized overall`
    #[inline]
    pub fn aggregate(&self, violent: f64, overall: f64) -> f64 {
        weighted_sum(self.violent.scale(violent), self.overall.scale(overall))
    }

    /// Aggregated crime rescaled against the dataset's aggregate range, in [0, 1] for listings
    #[inline]
    pub fn normalized(&self, violent: f64, overall: f64) -> f64 {
        self.aggregate.scale(self.aggregate(violent, overall))
    }

    /// Exposure used as a feature dimension, in [0, 3] for listings
    #[inline]
    pub fn exposure(&self, violent: f64, overall: f64) -> f64 {
        self.normalized(violent, overall) * CRIME_EXPOSURE_SCALE
    }
}

#[inline]
fn weighted_sum(violent: f64, overall: f64) -> f64 {
    VIOLENT_CRIME_WEIGHT * violent + overall
}
