// Service exports
pub mod cache;
pub mod dataset;
pub mod directions;

pub use cache::{CacheKey, CacheStats, TransitCache};
pub use dataset::{CleaningRules, DatasetError, DatasetLoader};
pub use directions::{DirectionsClient, DirectionsError};
