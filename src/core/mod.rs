// Core algorithm exports
pub mod crime;
pub mod engine;
pub mod error;
pub mod filters;
pub mod normalize;
pub mod ranker;
pub mod tradeoff;

pub use crime::CrimeAggregator;
pub use engine::{score_and_rank, EngineOptions, Recommender};
pub use error::EngineError;
pub use filters::{apply_result_filters, is_current_address, matches_room_tolerance};
pub use normalize::{mean, min_max_scale, MinMaxRange, Scaled};
pub use ranker::{rank, similarity, weighted_distance, DimensionScales, FeatureVector};
pub use tradeoff::{rent_per_room, TradeoffCurve, TradeoffModel};
