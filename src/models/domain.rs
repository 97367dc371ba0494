use crate::core::error::EngineError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Campuses with a transit/driving distance column in the listings dataset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Campus {
    NortheasternUniversity,
    BostonUniversity,
    BostonCollege,
}

impl Campus {
    pub const ALL: [Campus; 3] = [
        Campus::NortheasternUniversity,
        Campus::BostonUniversity,
        Campus::BostonCollege,
    ];

    /// Display name, also used as the directions-API destination
    pub fn name(&self) -> &'static str {
        match self {
            Campus::NortheasternUniversity => "Northeastern University",
            Campus::BostonUniversity => "Boston University",
            Campus::BostonCollege => "Boston College",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Campus::NortheasternUniversity => "northeastern_university",
            Campus::BostonUniversity => "boston_university",
            Campus::BostonCollege => "boston_college",
        }
    }

    /// Dataset column holding the transit distance to this campus
    pub fn transit_column(&self) -> &'static str {
        match self {
            Campus::NortheasternUniversity => "Northeastern University_transit_distance",
            Campus::BostonUniversity => "Boston University_transit_distance",
            Campus::BostonCollege => "Boston College_transit_distance",
        }
    }
}

impl fmt::Display for Campus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Campus {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Campus::ALL
            .into_iter()
            .find(|campus| {
                campus.name().eq_ignore_ascii_case(trimmed) || campus.slug() == trimmed
            })
            .ok_or_else(|| EngineError::InvalidLocation(trimmed.to_string()))
    }
}

/// One distance value per supported campus
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CampusDistances {
    #[serde(rename = "northeasternUniversity")]
    pub northeastern_university: Option<f64>,
    #[serde(rename = "bostonUniversity")]
    pub boston_university: Option<f64>,
    #[serde(rename = "bostonCollege")]
    pub boston_college: Option<f64>,
}

impl CampusDistances {
    pub fn get(&self, campus: Campus) -> Option<f64> {
        match campus {
            Campus::NortheasternUniversity => self.northeastern_university,
            Campus::BostonUniversity => self.boston_university,
            Campus::BostonCollege => self.boston_college,
        }
    }

    pub fn set(&mut self, campus: Campus, value: Option<f64>) {
        match campus {
            Campus::NortheasternUniversity => self.northeastern_university = value,
            Campus::BostonUniversity => self.boston_university = value,
            Campus::BostonCollege => self.boston_college = value,
        }
    }
}

/// One row of the cleaned listings dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    #[serde(rename = "areaName")]
    pub area_name: String,
    pub address: String,
    pub rent: f64,
    pub bed: f64,
    pub bath: f64,
    #[serde(rename = "violentCrimeRate")]
    pub violent_crime_rate: Option<f64>,
    #[serde(rename = "overallCrimeRate")]
    pub overall_crime_rate: Option<f64>,
    #[serde(rename = "transitDistance")]
    pub transit_distance: CampusDistances,
    #[serde(rename = "drivingDistance")]
    pub driving_distance: CampusDistances,
}

impl Listing {
    pub fn transit_distance_to(&self, campus: Campus) -> Option<f64> {
        self.transit_distance.get(campus)
    }

    pub fn driving_distance_to(&self, campus: Campus) -> Option<f64> {
        self.driving_distance.get(campus)
    }
}

/// How crime exposure participates in the ranking vector
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyMode {
    /// Crime is left out of the feature vector
    Ignore,
    /// Crime is a dimension with a neutral query baseline of 0
    #[default]
    SoftPenalty,
    /// Crime is a dimension with an elevated query baseline of 1
    HardPenalty,
}

impl SafetyMode {
    /// Map the legacy numeric safety level (0, 1, 2)
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            0 => Some(SafetyMode::Ignore),
            1 => Some(SafetyMode::SoftPenalty),
            2 => Some(SafetyMode::HardPenalty),
            _ => None,
        }
    }

    /// Query-side crime coordinate, `None` when crime is not a dimension
    pub fn crime_baseline(&self) -> Option<f64> {
        match self {
            SafetyMode::Ignore => None,
            SafetyMode::SoftPenalty => Some(0.0),
            SafetyMode::HardPenalty => Some(1.0),
        }
    }

    pub fn includes_crime(&self) -> bool {
        self.crime_baseline().is_some()
    }
}

/// User-supplied scaling of the rent and location tradeoff curves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreferenceWeights {
    #[serde(rename = "rentWeight", default = "default_weight")]
    pub rent: f64,
    #[serde(rename = "locationWeight", default = "default_weight")]
    pub location: f64,
    #[serde(rename = "safetyMode", default)]
    pub safety: SafetyMode,
}

fn default_weight() -> f64 { 1.0 }

impl Default for PreferenceWeights {
    fn default() -> Self {
        Self {
            rent: default_weight(),
            location: default_weight(),
            safety: SafetyMode::default(),
        }
    }
}

impl PreferenceWeights {
    /// Both weights must be positive normal floats (finite, non-zero, not subnormal)
    pub fn validate(&self) -> Result<(), EngineError> {
        for (name, value) in [("rent", self.rent), ("location", self.location)] {
            if !value.is_normal() || value < 0.0 {
                return Err(EngineError::InvalidWeight { name, value });
            }
        }
        Ok(())
    }
}

/// The user's current situation and preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    #[serde(rename = "currentAddress")]
    pub current_address: String,
    pub campus: String,
    pub rent: f64,
    pub bed: u32,
    pub bath: u32,
    #[serde(rename = "transitDistance")]
    pub transit_distance: Option<f64>,
    #[serde(rename = "violentCrimeRate")]
    pub violent_crime_rate: Option<f64>,
    #[serde(rename = "overallCrimeRate")]
    pub overall_crime_rate: Option<f64>,
    #[serde(default)]
    pub weights: PreferenceWeights,
}

/// A listing with the fields derived during one scoring call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredListing {
    #[serde(flatten)]
    pub listing: Listing,
    #[serde(rename = "rentPerRoom")]
    pub rent_per_room: f64,
    #[serde(rename = "rentTradeoff")]
    pub rent_tradeoff: f64,
    #[serde(rename = "distanceTradeoff")]
    pub distance_tradeoff: f64,
    #[serde(rename = "combinedTradeoff")]
    pub combined_tradeoff: f64,
    /// `None` when crime is ignored and the dataset's crime rates are constant
    #[serde(rename = "scaledCrimeExposure")]
    pub scaled_crime_exposure: Option<f64>,
    #[serde(rename = "similarityScore")]
    pub similarity_score: f64,
}

/// Route chosen among the directions-API alternatives
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitRoute {
    #[serde(rename = "durationSeconds")]
    pub duration_secs: u64,
    #[serde(rename = "transitDistance")]
    pub transit_distance: f64,
    #[serde(rename = "walkDistance")]
    pub walk_distance: f64,
}
