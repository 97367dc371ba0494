// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Campus, CampusDistances, Listing, PreferenceWeights, Query, SafetyMode, ScoredListing, TransitRoute};
pub use requests::{FuturePreferences, LivingConditions, RecommendRequest};
pub use responses::{ErrorResponse, HealthResponse, RecommendResponse};
