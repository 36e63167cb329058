// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{BoundingBox, GeoPoint, MatchResult, Prediction, ReferenceRecord};
pub use requests::{ExamplesNearbyQuery, PredictQuery, SearchNearbyQuery};
pub use responses::{ErrorResponse, HealthResponse, NearbyResponse, PredictResponse};
