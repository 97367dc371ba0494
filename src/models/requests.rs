use crate::models::domain::{PreferenceWeights, Query, SafetyMode};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to rank listings for a user
///
/// Mirrors the chatbot's final output:
/// ```json
/// {
///   "current_living_conditions": ["165 Hemenway St", "Boston University", 2950, 2, 1],
///   "preference_of_future_house": { "Rent": 1, "Location": 1, "Safety": 1 }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecommendRequest {
    #[validate(nested)]
    pub current_living_conditions: LivingConditions,
    #[serde(default)]
    #[validate(nested)]
    pub preference_of_future_house: FuturePreferences,
    #[serde(default)]
    #[validate(range(min = 1))]
    pub limit: Option<u16>,
    #[serde(rename = "violentCrimeRate", default)]
    #[validate(range(min = 0.0))]
    pub violent_crime_rate: Option<f64>,
    #[serde(rename = "overallCrimeRate", default)]
    #[validate(range(min = 0.0))]
    pub overall_crime_rate: Option<f64>,
}

/// `[address, campus, rent, bed, bath]` on the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(from = "LivingConditionsRow", into = "LivingConditionsRow")]
pub struct LivingConditions {
    #[validate(length(min = 1))]
    pub current_address: String,
    #[validate(length(min = 1))]
    pub campus: String,
    #[validate(range(exclusive_min = 0.0))]
    pub rent: f64,
    pub bed: u32,
    pub bath: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LivingConditionsRow(String, String, f64, u32, u32);

impl From<LivingConditionsRow> for LivingConditions {
    fn from(row: LivingConditionsRow) -> Self {
        let LivingConditionsRow(current_address, campus, rent, bed, bath) = row;
        Self { current_address, campus, rent, bed, bath }
    }
}

impl From<LivingConditions> for LivingConditionsRow {
    fn from(c: LivingConditions) -> Self {
        LivingConditionsRow(c.current_address, c.campus, c.rent, c.bed, c.bath)
    }
}

/// Preference weights as sent by the client; absent values default to 1
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct FuturePreferences {
    #[serde(rename = "Rent", default)]
    #[validate(range(exclusive_min = 0.0))]
    pub rent: Option<f64>,
    #[serde(rename = "Location", default)]
    #[validate(range(exclusive_min = 0.0))]
    pub location: Option<f64>,
    /// Legacy safety level: 0 ignore, 1 soft penalty, 2 hard penalty
    #[serde(rename = "Safety", default)]
    #[validate(range(max = 2))]
    pub safety: Option<u8>,
}

impl FuturePreferences {
    pub fn weights(&self) -> PreferenceWeights {
        let defaults = PreferenceWeights::default();
        PreferenceWeights {
            rent: self.rent.unwrap_or(defaults.rent),
            location: self.location.unwrap_or(defaults.location),
            safety: self
                .safety
                .and_then(SafetyMode::from_level)
                .unwrap_or(defaults.safety),
        }
    }
}

impl RecommendRequest {
    /// Build the engine query once the transit distance has been resolved
    ///
    /// Crime estimates fall back to `default_crime` (violent, overall) when the
    /// request does not carry them.
    pub fn to_query(&self, transit_distance: Option<f64>, default_crime: (f64, f64)) -> Query {
        let conditions = &self.current_living_conditions;
        Query {
            current_address: conditions.current_address.clone(),
            campus: conditions.campus.clone(),
            rent: conditions.rent,
            bed: conditions.bed,
            bath: conditions.bath,
            transit_distance,
            violent_crime_rate: Some(self.violent_crime_rate.unwrap_or(default_crime.0)),
            overall_crime_rate: Some(self.overall_crime_rate.unwrap_or(default_crime.1)),
            weights: self.preference_of_future_house.weights(),
        }
    }
}
