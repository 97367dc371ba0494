use crate::core::{
    crime::CrimeAggregator,
    error::EngineError,
    filters::apply_result_filters,
    normalize::MinMaxRange,
    ranker::{rank, similarity, weighted_distance, DimensionScales, FeatureVector},
    tradeoff::{rent_per_room, TradeoffModel},
};
use crate::models::{Campus, Listing, Query, SafetyMode, ScoredListing};
use rayon::prelude::*;

/// Datasets at least this large are scored in parallel by default
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 2048;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Minimum dataset size scored on the rayon pool; `usize::MAX` disables it
    pub parallel_threshold: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

/// Recommendation scoring engine
///
/// # Pipeline Stages
/// 1. Validate the query, weights and every listing
/// 2. Fit dataset-wide ranges, means and tradeoff curves
/// 3. Score each listing independently (in parallel for large datasets)
/// 4. Stable sort by similarity
/// 5. Drop the current address and listings outside the room tolerance
///
/// Holds no dataset state: every call borrows its own snapshot.
#[derive(Debug, Clone, Default)]
pub struct Recommender {
    options: EngineOptions,
}

impl Recommender {
    pub fn new(options: EngineOptions) -> Self {
        Self { options }
    }

    pub fn with_default_options() -> Self {
        Self::default()
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    /// Score every listing against the query and return them ranked and filtered
    ///
    /// Either the complete, sorted, filtered sequence is returned or a typed
    /// error; truncation to a display count is left to the caller.
    pub fn score_and_rank(
        &self,
        dataset: &[Listing],
        query: &Query,
    ) -> Result<Vec<ScoredListing>, EngineError> {
        let campus: Campus = query.campus.parse()?;
        query.weights.validate()?;

        if dataset.is_empty() {
            return Err(EngineError::EmptyDataset);
        }

        let query_inputs = QueryInputs::extract(query)?;
        let columns = Columns::extract(dataset, campus)?;
        let model = ScoringModel::fit(&columns, &query_inputs, query)?;

        tracing::debug!(
            "Scoring {} listings for {} (mode: {:?}, query crime exposure: {:?})",
            dataset.len(),
            campus,
            query.weights.safety,
            model.query_crime_exposure,
        );

        let mut scored: Vec<ScoredListing> = if dataset.len() >= self.options.parallel_threshold {
            dataset
                .par_iter()
                .zip(columns.rows.par_iter())
                .map(|(listing, row)| model.score(listing, row))
                .collect::<Result<_, _>>()?
        } else {
            dataset
                .iter()
                .zip(&columns.rows)
                .map(|(listing, row)| model.score(listing, row))
                .collect::<Result<_, _>>()?
        };

        rank(&mut scored);
        let results = apply_result_filters(scored, query);

        tracing::debug!(
            "Ranked {} listings, {} remain after filtering",
            dataset.len(),
            results.len()
        );

        Ok(results)
    }
}

/// Score and rank with the default engine options
pub fn score_and_rank(dataset: &[Listing], query: &Query) -> Result<Vec<ScoredListing>, EngineError> {
    Recommender::with_default_options().score_and_rank(dataset, query)
}

struct QueryInputs {
    rent_per_room: f64,
    transit: f64,
    violent: f64,
    overall: f64,
}

impl QueryInputs {
    fn extract(query: &Query) -> Result<Self, EngineError> {
        let bed = f64::from(query.bed);
        let bath = f64::from(query.bath);
        let rent_per_room = rent_per_room(query.rent, bed, bath).ok_or_else(|| {
            EngineError::InvalidRoomCount {
                subject: "query".to_string(),
                bed,
                bath,
            }
        })?;

        Ok(Self {
            rent_per_room,
            transit: required(query.transit_distance, "transit distance", "query")?,
            violent: required(query.violent_crime_rate, "violent crime rate", "query")?,
            overall: required(query.overall_crime_rate, "overall crime rate", "query")?,
        })
    }
}

/// The numeric inputs of one listing
#[derive(Debug, Clone, Copy)]
struct Row {
    rent_per_room: f64,
    transit: f64,
    violent: f64,
    overall: f64,
}

/// Explicit per-series columns extracted from the dataset
struct Columns {
    rows: Vec<Row>,
    rent_per_room: Vec<f64>,
    transit: Vec<f64>,
    violent: Vec<f64>,
    overall: Vec<f64>,
}

impl Columns {
    fn extract(dataset: &[Listing], campus: Campus) -> Result<Self, EngineError> {
        let rows = dataset
            .iter()
            .map(|listing| {
                let rent_per_room = rent_per_room(listing.rent, listing.bed, listing.bath)
                    .ok_or_else(|| EngineError::InvalidRoomCount {
                        subject: listing.address.clone(),
                        bed: listing.bed,
                        bath: listing.bath,
                    })?;

                Ok(Row {
                    rent_per_room,
                    transit: required(
                        listing.transit_distance_to(campus),
                        campus.transit_column(),
                        &listing.address,
                    )?,
                    violent: required(listing.violent_crime_rate, "violent crime rate", &listing.address)?,
                    overall: required(listing.overall_crime_rate, "overall crime rate", &listing.address)?,
                })
            })
            .collect::<Result<Vec<Row>, EngineError>>()?;

        Ok(Self {
            rent_per_room: rows.iter().map(|r| r.rent_per_room).collect(),
            transit: rows.iter().map(|r| r.transit).collect(),
            violent: rows.iter().map(|r| r.violent).collect(),
            overall: rows.iter().map(|r| r.overall).collect(),
            rows,
        })
    }
}

/// Everything fitted over the dataset that a single listing's score depends on
struct ScoringModel {
    mode: SafetyMode,
    rent_range: MinMaxRange,
    transit_range: MinMaxRange,
    tradeoffs: TradeoffModel,
    /// Absent only when crime is ignored and its series are constant
    crime: Option<CrimeAggregator>,
    scales: DimensionScales,
    query_vector: FeatureVector,
    query_crime_exposure: Option<f64>,
}

impl ScoringModel {
    fn fit(columns: &Columns, inputs: &QueryInputs, query: &Query) -> Result<Self, EngineError> {
        let mode = query.weights.safety;
        let rent_range = MinMaxRange::fit("rent per room", &columns.rent_per_room)?;
        let transit_range = MinMaxRange::fit("transit distance", &columns.transit)?;
        let tradeoffs = TradeoffModel::fit(
            &columns.rent_per_room,
            inputs.rent_per_room,
            &columns.transit,
            inputs.transit,
            &query.weights,
        )?;
        let crime = match CrimeAggregator::fit(&columns.violent, &columns.overall) {
            Ok(crime) => Some(crime),
            Err(EngineError::DegenerateRange { series, value }) if !mode.includes_crime() => {
                tracing::debug!(
                    "Crime series {} is constant at {}; exposure omitted while crime is ignored",
                    series,
                    value
                );
                None
            }
            Err(e) => return Err(e),
        };

        let query_vector = FeatureVector::for_query(
            mode,
            transit_range.scale(inputs.transit),
            rent_range.scale(inputs.rent_per_room),
            tradeoffs.baseline(),
        );

        Ok(Self {
            mode,
            rent_range,
            transit_range,
            tradeoffs,
            crime,
            scales: DimensionScales::from_weights(&query.weights),
            query_vector,
            query_crime_exposure: crime.map(|c| c.normalized(inputs.violent, inputs.overall)),
        })
    }

    fn score(&self, listing: &Listing, row: &Row) -> Result<ScoredListing, EngineError> {
        let tradeoff = self.tradeoffs.evaluate(row.rent_per_room, row.transit);
        let crime_exposure = self.crime.map(|c| c.exposure(row.violent, row.overall));

        let vector = FeatureVector::for_listing(
            self.mode,
            self.transit_range.scale(row.transit),
            self.rent_range.scale(row.rent_per_room),
            tradeoff.combined(),
            crime_exposure,
        );
        let distance = weighted_distance(&self.query_vector, &vector, &self.scales);
        if !distance.is_finite() {
            return Err(EngineError::NonFiniteValue { series: "feature distance" });
        }

        Ok(ScoredListing {
            listing: listing.clone(),
            rent_per_room: row.rent_per_room,
            rent_tradeoff: tradeoff.rent,
            distance_tradeoff: tradeoff.distance,
            combined_tradeoff: tradeoff.combined(),
            scaled_crime_exposure: crime_exposure,
            similarity_score: similarity(distance),
        })
    }
}

fn required(value: Option<f64>, field: &'static str, subject: &str) -> Result<f64, EngineError> {
    value.ok_or_else(|| EngineError::MissingField {
        field,
        subject: subject.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CampusDistances, PreferenceWeights};

    fn create_listing(address: &str, rent: f64, transit: f64, violent: f64, overall: f64) -> Listing {
        let mut transit_distance = CampusDistances::default();
        transit_distance.set(Campus::BostonUniversity, Some(transit));

        Listing {
            area_name: "Fenway".to_string(),
            address: address.to_string(),
            rent,
            bed: 2.0,
            bath: 1.0,
            violent_crime_rate: Some(violent),
            overall_crime_rate: Some(overall),
            transit_distance,
            driving_distance: CampusDistances::default(),
        }
    }

    fn create_query(safety: SafetyMode) -> Query {
        Query {
            current_address: "C".to_string(),
            campus: "Boston University".to_string(),
            rent: 2950.0,
            bed: 2,
            bath: 1,
            transit_distance: Some(196.0),
            violent_crime_rate: Some(0.2866),
            overall_crime_rate: Some(1.86),
            weights: PreferenceWeights { rent: 1.0, location: 1.0, safety },
        }
    }

    fn create_dataset() -> Vec<Listing> {
        vec![
            create_listing("A", 3000.0, 200.0, 0.3, 2.0),
            create_listing("B", 2000.0, 100.0, 0.1, 1.0),
        ]
    }

    #[test]
    fn test_closer_listing_ranks_first() {
        let results = score_and_rank(&create_dataset(), &create_query(SafetyMode::Ignore)).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].listing.address, "A");
        assert_eq!(results[1].listing.address, "B");
        assert!(results[0].similarity_score > results[1].similarity_score);
    }

    #[test]
    fn test_derived_fields() {
        let results = score_and_rank(&create_dataset(), &create_query(SafetyMode::SoftPenalty)).unwrap();
        let a = results.iter().find(|s| s.listing.address == "A").unwrap();

        assert_eq!(a.rent_per_room, 1200.0);
        assert!((a.combined_tradeoff - (a.rent_tradeoff + a.distance_tradeoff)).abs() < 1e-12);
        assert_eq!(a.scaled_crime_exposure, Some(3.0));
    }

    #[test]
    fn test_hard_penalty_prefers_safer_listing() {
        let mut dataset = create_dataset();
        dataset.push(create_listing("Safe", 2950.0, 196.0, 0.1, 1.0));
        dataset.push(create_listing("Risky", 2950.0, 196.0, 0.3, 2.0));

        let results = score_and_rank(&dataset, &create_query(SafetyMode::HardPenalty)).unwrap();
        let position = |addr: &str| results.iter().position(|s| s.listing.address == addr).unwrap();

        assert!(position("Safe") < position("Risky"));
    }

    #[test]
    fn test_invalid_campus_fails() {
        let mut query = create_query(SafetyMode::Ignore);
        query.campus = "Unknown".to_string();

        let err = score_and_rank(&create_dataset(), &query).unwrap_err();
        assert_eq!(err, EngineError::InvalidLocation("Unknown".to_string()));
    }

    #[test]
    fn test_empty_dataset_fails() {
        let err = score_and_rank(&[], &create_query(SafetyMode::Ignore)).unwrap_err();
        assert_eq!(err, EngineError::EmptyDataset);
    }

    #[test]
    fn test_missing_query_transit_fails() {
        let mut query = create_query(SafetyMode::Ignore);
        query.transit_distance = None;

        let err = score_and_rank(&create_dataset(), &query).unwrap_err();
        assert_eq!(
            err,
            EngineError::MissingField { field: "transit distance", subject: "query".to_string() }
        );
    }

    #[test]
    fn test_missing_listing_transit_fails() {
        let mut dataset = create_dataset();
        dataset[1].transit_distance = CampusDistances::default();

        let err = score_and_rank(&dataset, &create_query(SafetyMode::Ignore)).unwrap_err();
        assert_eq!(
            err,
            EngineError::MissingField {
                field: "Boston University_transit_distance",
                subject: "B".to_string(),
            }
        );
    }

    #[test]
    fn test_zero_room_listing_fails() {
        let mut dataset = create_dataset();
        dataset[0].bed = 0.0;
        dataset[0].bath = 0.0;

        let err = score_and_rank(&dataset, &create_query(SafetyMode::Ignore)).unwrap_err();
        assert!(matches!(err, EngineError::InvalidRoomCount { ref subject, .. } if subject == "A"));
    }

    #[test]
    fn test_small_rent_weight_keeps_scores_positive() {
        let mut dataset = create_dataset();
        dataset.push(create_listing("Big", 9000.0, 150.0, 0.2, 1.5));
        let mut query = create_query(SafetyMode::Ignore);
        query.weights.rent = 0.005;

        let results = score_and_rank(&dataset, &query).unwrap();

        assert_eq!(results.len(), 3);
        for s in &results {
            assert!(s.similarity_score > 0.0 && s.similarity_score <= 1.0, "{}: {}", s.listing.address, s.similarity_score);
            assert!(s.combined_tradeoff.is_finite());
        }
        assert_eq!(results.last().unwrap().listing.address, "Big");
    }

    #[test]
    fn test_overflowing_distance_is_an_error() {
        let mut query = create_query(SafetyMode::Ignore);
        query.weights.location = f64::MAX;
        query.transit_distance = Some(1000.0);

        let err = score_and_rank(&create_dataset(), &query).unwrap_err();
        assert_eq!(err, EngineError::NonFiniteValue { series: "feature distance" });
    }

    #[test]
    fn test_constant_crime_is_tolerated_when_ignored() {
        let dataset = vec![
            create_listing("A", 3000.0, 200.0, 0.3, 2.0),
            create_listing("B", 2000.0, 100.0, 0.3, 2.0),
        ];

        let results = score_and_rank(&dataset, &create_query(SafetyMode::Ignore)).unwrap();
        assert_eq!(results[0].listing.address, "A");
        assert!(results.iter().all(|s| s.scaled_crime_exposure.is_none()));

        let err = score_and_rank(&dataset, &create_query(SafetyMode::SoftPenalty)).unwrap_err();
        assert_eq!(
            err,
            EngineError::DegenerateRange { series: "violent crime rate", value: 0.3 }
        );
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let dataset: Vec<Listing> = (0..300)
            .map(|i| {
                create_listing(
                    &format!("{} Main St", i),
                    1800.0 + (i % 17) as f64 * 75.0,
                    100.0 + (i % 23) as f64 * 40.0,
                    0.05 + (i % 7) as f64 * 0.04,
                    0.8 + (i % 5) as f64 * 0.3,
                )
            })
            .collect();
        let query = create_query(SafetyMode::SoftPenalty);

        let sequential = Recommender::new(EngineOptions { parallel_threshold: usize::MAX })
            .score_and_rank(&dataset, &query)
            .unwrap();
        let parallel = Recommender::new(EngineOptions { parallel_threshold: 1 })
            .score_and_rank(&dataset, &query)
            .unwrap();

        assert_eq!(sequential, parallel);
    }
}
