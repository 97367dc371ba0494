use crate::core::{error::EngineError, normalize::mean};
use crate::models::PreferenceWeights;

/// A bathroom counts as half a room when sizing a unit
pub const BATH_ROOM_FACTOR: f64 = 0.5;

/// Numerator of the curve scale, `scale = TRADEOFF_SCALE_NUMERATOR / weight`
pub const TRADEOFF_SCALE_NUMERATOR: f64 = 2.0;

/// Upper bound on the curve exponent; `exp(700)` is the largest tradeoff value
/// and two of them still sum to a finite combined tradeoff
pub const MAX_TRADEOFF_EXPONENT: f64 = 700.0;

#[inline]
pub fn room_count(bed: f64, bath: f64) -> f64 {
    bed + BATH_ROOM_FACTOR * bath
}

/// Rent divided by `bed + 0.5 * bath`, or `None` when the room count is not positive
#[inline]
pub fn rent_per_room(rent: f64, bed: f64, bath: f64) -> Option<f64> {
    let rooms = room_count(bed, bath);
    if rooms > 0.0 {
        Some(rent / rooms)
    } else {
        None
    }
}

/// Exponential penalty on the deviation of a value from the query's own value
///
/// `tradeoff(x) = exp(scale * (x - reference) / mean)` where `mean` is taken
/// over the dataset's series. Deviations near zero barely move the value away
/// from 1, large deviations grow super-linearly until the exponent saturates at
/// [`MAX_TRADEOFF_EXPONENT`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeoffCurve {
    pub reference: f64,
    pub mean: f64,
    pub scale: f64,
}

impl TradeoffCurve {
    /// Fit a curve to a dataset series around the query's `reference` value
    pub fn fit(
        series: &'static str,
        values: &[f64],
        reference: f64,
        weight: f64,
    ) -> Result<Self, EngineError> {
        let mean = mean(series, values)?;
        if mean == 0.0 {
            return Err(EngineError::DegenerateRange { series, value: 0.0 });
        }
        if !reference.is_finite() {
            return Err(EngineError::NonFiniteValue { series });
        }

        Ok(Self {
            reference,
            mean,
            scale: TRADEOFF_SCALE_NUMERATOR / weight,
        })
    }

    #[inline]
    pub fn apply(&self, value: f64) -> f64 {
        let exponent = (value - self.reference) / self.mean * self.scale;
        exponent.min(MAX_TRADEOFF_EXPONENT).exp()
    }

    /// The curve evaluated at zero deviation
    #[inline]
    pub fn baseline(&self) -> f64 {
        self.apply(self.reference)
    }
}

/// Per-listing tradeoff values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tradeoff {
    pub rent: f64,
    pub distance: f64,
}

impl Tradeoff {
    #[inline]
    pub fn combined(&self) -> f64 {
        self.rent + self.distance
    }
}

/// Rent and commute-distance curves fitted for one query
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TradeoffModel {
    pub rent: TradeoffCurve,
    pub distance: TradeoffCurve,
}

impl TradeoffModel {
    pub fn fit(
        rent_per_room: &[f64],
        query_rent_per_room: f64,
        transit: &[f64],
        query_transit: f64,
        weights: &PreferenceWeights,
    ) -> Result<Self, EngineError> {
        weights.validate()?;

        Ok(Self {
            rent: TradeoffCurve::fit("rent per room", rent_per_room, query_rent_per_room, weights.rent)?,
            distance: TradeoffCurve::fit("transit distance", transit, query_transit, weights.location)?,
        })
    }

    #[inline]
    pub fn evaluate(&self, rent_per_room: f64, transit: f64) -> Tradeoff {
        Tradeoff {
            rent: self.rent.apply(rent_per_room),
            distance: self.distance.apply(transit),
        }
    }

    /// Combined tradeoff at the query's own position in feature space
    pub fn baseline(&self) -> f64 {
        self.rent.baseline() + self.distance.baseline()
    }
}
