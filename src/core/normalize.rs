use crate::core::error::EngineError;

/// Observed bounds of a numeric series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MinMaxRange {
    pub min: f64,
    pub max: f64,
}

impl MinMaxRange {
    /// Fit the range of a finite, non-empty series
    ///
    /// Fails with `DegenerateRange` when every value is the same, since the
    /// rescaling would divide by zero.
    pub fn fit(series: &'static str, values: &[f64]) -> Result<Self, EngineError> {
        if values.is_empty() {
            return Err(EngineError::EmptyDataset);
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for &value in values {
            if !value.is_finite() {
                return Err(EngineError::NonFiniteValue { series });
            }
            min = min.min(value);
            max = max.max(value);
        }

        if min == max {
            return Err(EngineError::DegenerateRange { series, value: min });
        }

        Ok(Self { min, max })
    }

    #[inline]
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// Rescale a value against this range, `(x - min) / (max - min)`
    #[inline]
    pub fn scale(&self, value: f64) -> f64 {
        (value - self.min) / self.span()
    }

    /// Inverse of [`MinMaxRange::scale`]
    #[inline]
    pub fn unscale(&self, scaled: f64) -> f64 {
        scaled * self.span() + self.min
    }
}

/// A rescaled series together with the query value rescaled on the same range
#[derive(Debug, Clone, PartialEq)]
pub struct Scaled {
    pub range: MinMaxRange,
    pub series: Vec<f64>,
    pub query: f64,
}

/// Min-max rescale `values` into [0, 1] and rescale `query` with the same bounds
///
/// The query value is not clamped: a query outside the dataset's range lands
/// outside [0, 1].
pub fn min_max_scale(series: &'static str, values: &[f64], query: f64) -> Result<Scaled, EngineError> {
    let range = MinMaxRange::fit(series, values)?;
    if !query.is_finite() {
        return Err(EngineError::NonFiniteValue { series });
    }

    Ok(Scaled {
        range,
        series: values.iter().map(|&v| range.scale(v)).collect(),
        query: range.scale(query),
    })
}

/// Arithmetic mean of a finite, non-empty series
pub fn mean(series: &'static str, values: &[f64]) -> Result<f64, EngineError> {
    if values.is_empty() {
        return Err(EngineError::EmptyDataset);
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(EngineError::NonFiniteValue { series });
    }

    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extremes_map_to_unit_bounds() {
        let scaled = min_max_scale("rent", &[1200.0, 800.0, 1000.0], 1100.0).unwrap();

        assert_eq!(scaled.series, vec![1.0, 0.0, 0.5]);
        assert!((scaled.query - 0.75).abs() < 1e-12);
    }

    #[test]
    fn test_query_outside_range_is_not_clamped() {
        let scaled = min_max_scale("transit", &[100.0, 200.0], 250.0).unwrap();
        assert!((scaled.query - 1.5).abs() < 1e-12);

        let scaled = min_max_scale("transit", &[100.0, 200.0], 50.0).unwrap();
        assert!((scaled.query + 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_unscale_reads_back_original() {
        let values = [3.7, -2.1, 0.004, 1e4, 42.0];
        let scaled = min_max_scale("mixed", &values, 0.0).unwrap();

        for (original, normalized) in values.iter().zip(&scaled.series) {
            let restored = scaled.range.unscale(*normalized);
            assert!((restored - original).abs() < 1e-9, "{} != {}", restored, original);
        }
    }

    #[test]
    fn test_constant_series_is_degenerate() {
        let err = min_max_scale("rent", &[5.0, 5.0, 5.0], 5.0).unwrap_err();
        assert_eq!(err, EngineError::DegenerateRange { series: "rent", value: 5.0 });
    }

    #[test]
    fn test_single_value_is_degenerate() {
        let err = MinMaxRange::fit("rent", &[1800.0]).unwrap_err();
        assert!(matches!(err, EngineError::DegenerateRange { .. }));
    }

    #[test]
    fn test_non_finite_values_rejected() {
        let err = MinMaxRange::fit("crime", &[1.0, f64::NAN]).unwrap_err();
        assert_eq!(err, EngineError::NonFiniteValue { series: "crime" });

        let err = min_max_scale("crime", &[1.0, 2.0], f64::INFINITY).unwrap_err();
        assert_eq!(err, EngineError::NonFiniteValue { series: "crime" });
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean("rent", &[1200.0, 800.0]).unwrap(), 1000.0);
        assert_eq!(mean("rent", &[]), Err(EngineError::EmptyDataset));
    }
}
