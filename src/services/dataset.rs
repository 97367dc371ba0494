use crate::models::{Campus, CampusDistances, Listing};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;

/// Default cutoff on the driving distance to the reference campus
pub const DEFAULT_MAX_DRIVING_DISTANCE: f64 = 25000.0;

/// Errors that can occur while loading the listings dataset
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("Failed to open dataset {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("No listings remain after cleaning ({read} rows read)")]
    Empty { read: usize },
}

/// Static cleaning filter applied at load time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CleaningRules {
    pub reference_campus: Campus,
    pub max_driving_distance: f64,
}

impl Default for CleaningRules {
    fn default() -> Self {
        Self {
            reference_campus: Campus::NortheasternUniversity,
            max_driving_distance: DEFAULT_MAX_DRIVING_DISTANCE,
        }
    }
}

/// Row as it appears in the listings CSV; unparsable cells become `None`
#[derive(Debug, Deserialize)]
struct RawListing {
    #[serde(rename = "Area Name")]
    area_name: Option<String>,
    #[serde(rename = "Address")]
    address: Option<String>,
    #[serde(rename = "Rent", default, deserialize_with = "csv::invalid_option")]
    rent: Option<f64>,
    #[serde(rename = "Bed", default, deserialize_with = "csv::invalid_option")]
    bed: Option<f64>,
    #[serde(rename = "Bath", default, deserialize_with = "csv::invalid_option")]
    bath: Option<f64>,
    #[serde(rename = "Violent CrimeRate", default, deserialize_with = "csv::invalid_option")]
    violent_crime_rate: Option<f64>,
    #[serde(rename = "Overall CrimeRate", default, deserialize_with = "csv::invalid_option")]
    overall_crime_rate: Option<f64>,
    #[serde(
        rename = "Northeastern University_transit_distance",
        alias = "Northeastern University_transit",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    northeastern_transit: Option<f64>,
    #[serde(rename = "Boston University_transit_distance", default, deserialize_with = "csv::invalid_option")]
    boston_university_transit: Option<f64>,
    #[serde(rename = "Boston College_transit_distance", default, deserialize_with = "csv::invalid_option")]
    boston_college_transit: Option<f64>,
    #[serde(rename = "Northeastern University_driving", default, deserialize_with = "csv::invalid_option")]
    northeastern_driving: Option<f64>,
    #[serde(rename = "Boston University_driving", default, deserialize_with = "csv::invalid_option")]
    boston_university_driving: Option<f64>,
    #[serde(rename = "Boston College_driving", default, deserialize_with = "csv::invalid_option")]
    boston_college_driving: Option<f64>,
}

impl RawListing {
    /// `None` when any field is missing or not a finite number
    fn into_listing(self) -> Option<Listing> {
        let area_name = self.area_name.filter(|s| !s.trim().is_empty())?;
        let address = self.address.filter(|s| !s.trim().is_empty())?;

        Some(Listing {
            area_name,
            address,
            rent: finite(self.rent)?,
            bed: finite(self.bed)?,
            bath: finite(self.bath)?,
            violent_crime_rate: Some(finite(self.violent_crime_rate)?),
            overall_crime_rate: Some(finite(self.overall_crime_rate)?),
            transit_distance: CampusDistances {
                northeastern_university: Some(finite(self.northeastern_transit)?),
                boston_university: Some(finite(self.boston_university_transit)?),
                boston_college: Some(finite(self.boston_college_transit)?),
            },
            driving_distance: CampusDistances {
                northeastern_university: Some(finite(self.northeastern_driving)?),
                boston_university: Some(finite(self.boston_university_driving)?),
                boston_college: Some(finite(self.boston_college_driving)?),
            },
        })
    }
}

/// `NaN` and `inf` parse as floats but mark missing data in the listings export
#[inline]
fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

/// Dataset Preparer: reads the listings CSV and applies the cleaning rules
#[derive(Debug, Clone, Default)]
pub struct DatasetLoader {
    rules: CleaningRules,
}

impl DatasetLoader {
    pub fn new(rules: CleaningRules) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> CleaningRules {
        self.rules
    }

    /// Load and clean the dataset at `path`
    pub fn load_path<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Listing>, DatasetError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| DatasetError::Open {
            path: path.display().to_string(),
            source,
        })?;

        tracing::info!("Loading listings from {}", path.display());
        self.load_reader(file)
    }

    /// Load and clean a dataset from any CSV source
    ///
    /// Rows with a missing field are dropped first, then rows farther than the
    /// driving cutoff from the reference campus.
    pub fn load_reader<R: Read>(&self, reader: R) -> Result<Vec<Listing>, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut read = 0usize;
        let mut complete = Vec::new();
        for record in reader.deserialize::<RawListing>() {
            read += 1;
            if let Some(listing) = record?.into_listing() {
                complete.push(listing);
            }
        }
        let dropped_missing = read - complete.len();

        let listings: Vec<Listing> = complete
            .into_iter()
            .filter(|listing| self.within_driving_cutoff(listing))
            .collect();
        let dropped_distance = read - dropped_missing - listings.len();

        tracing::info!(
            "Loaded {} listings ({} read, {} dropped for missing fields, {} beyond {} of {})",
            listings.len(),
            read,
            dropped_missing,
            dropped_distance,
            self.rules.max_driving_distance,
            self.rules.reference_campus,
        );

        if listings.is_empty() {
            return Err(DatasetError::Empty { read });
        }

        Ok(listings)
    }

    #[inline]
    fn within_driving_cutoff(&self, listing: &Listing) -> bool {
        listing
            .driving_distance_to(self.rules.reference_campus)
            .is_some_and(|d| d <= self.rules.max_driving_distance)
    }
}
