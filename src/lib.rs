//! RentRobo Algo - housing recommendation service
//!
//! This library ranks rental listings against a user's current rent, commute
//! and neighbourhood. The scoring engine in [`core`] is a pure, synchronous
//! computation over a caller-supplied dataset; the HTTP layer, CSV ingestion
//! and the directions-API client live in [`routes`] and [`services`].

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{score_and_rank, EngineError, EngineOptions, Recommender};
pub use crate::models::{Campus, Listing, PreferenceWeights, Query, SafetyMode, ScoredListing, RecommendRequest, RecommendResponse};
