use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Build a point, rejecting coordinates outside [-90, 90] x [-180, 180]
    pub fn new(lat: f64, lon: f64) -> Result<Self, String> {
        let point = Self { lat, lon };
        point.check()?;
        Ok(point)
    }

    /// Check the coordinate ranges. NaN and infinities never pass.
    pub fn check(&self) -> Result<(), String> {
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(format!("latitude {} is outside [-90, 90]", self.lat));
        }
        if !(-180.0..=180.0).contains(&self.lon) {
            return Err(format!("longitude {} is outside [-180, 180]", self.lon));
        }
        Ok(())
    }
}

impl From<GeoPoint> for geo::Point<f64> {
    fn from(point: GeoPoint) -> Self {
        geo::Point::new(point.lon, point.lat)
    }
}

/// A geotagged reference image
///
/// Serializes flat as `{id, name, lat, lon, url}`, which is the shape both the
/// examples file and the `images` table use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub id: String,
    pub name: String,
    #[serde(flatten)]
    pub point: GeoPoint,
    pub url: String,
}

impl ReferenceRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        lat: f64,
        lon: f64,
        url: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            point: GeoPoint { lat, lon },
            url: url.into(),
        }
    }
}

/// A reference record annotated with its distance from the query center
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(flatten)]
    pub record: ReferenceRecord,
    /// Great-circle distance in km, rounded to 3 decimals
    pub distance_km: f64,
}

/// One coordinate guess from the inference backend
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub lat: f64,
    pub lon: f64,
    pub prob: f64,
}

impl Prediction {
    pub fn point(&self) -> GeoPoint {
        GeoPoint {
            lat: self.lat,
            lon: self.lon,
        }
    }
}

/// Geospatial bounding box, in degrees
///
/// `min_lon`/`max_lon` may fall outside [-180, 180] when the box crosses the
/// antimeridian.
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}
