use serde::{Deserialize, Serialize};
use validator::Validate;

/// Query for `GET /examples/nearby`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ExamplesNearbyQuery {
    #[validate(range(min = -90.0, max = 90.0))]
    pub lat: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub lon: f64,
    /// Upper bound comes from `search.max_radius_km`
    #[serde(default = "default_radius_km")]
    #[validate(range(min = 0.0))]
    pub radius_km: f64,
}

/// Query for `POST /search/nearby`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SearchNearbyQuery {
    /// Upper bound comes from `search.max_radius_km`
    #[serde(default = "default_radius_km")]
    #[validate(range(min = 0.0))]
    pub radius_km: f64,
}

/// Query for `POST /predict/coords`
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PredictQuery {
    #[serde(default = "default_top_k")]
    #[validate(range(min = 1))]
    pub top_k: u16,
}

fn default_radius_km() -> f64 {
    10.0
}

fn default_top_k() -> u16 {
    1
}
