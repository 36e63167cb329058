use crate::core::collection::{CollectionError, ReferenceCollection};
use crate::core::distance::haversine;
use crate::models::{GeoPoint, MatchResult, ReferenceRecord};
use thiserror::Error;

/// Errors surfaced by a nearby search
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Reference collection unavailable: {0}")]
    CollectionUnavailable(#[from] CollectionError),
}

/// Round a distance to 3 decimal places, halves away from zero
#[inline]
pub fn round_km(distance_km: f64) -> f64 {
    (distance_km * 1000.0).round() / 1000.0
}

/// Reject centers outside the coordinate ranges and negative or non-finite radii
pub fn validate_query(center: GeoPoint, radius_km: f64) -> Result<(), SearchError> {
    center.check().map_err(SearchError::InvalidArgument)?;

    if !radius_km.is_finite() || radius_km < 0.0 {
        return Err(SearchError::InvalidArgument(format!(
            "radius_km must be a non-negative number, got {}",
            radius_km
        )));
    }

    Ok(())
}

/// Rank the records lying within `radius_km` of `center`
///
/// The radius check is inclusive and runs on the unrounded distance. Results
/// are sorted by the rounded distance with a stable sort, so equal distances
/// keep the order in which `records` yielded them.
pub fn rank_nearby<'a, I>(
    center: GeoPoint,
    radius_km: f64,
    records: I,
) -> Result<Vec<MatchResult>, SearchError>
where
    I: IntoIterator<Item = &'a ReferenceRecord>,
{
    validate_query(center, radius_km)?;

    let mut matches: Vec<MatchResult> = records
        .into_iter()
        .filter_map(|record| {
            let distance_km = haversine(center, record.point);
            (distance_km <= radius_km).then(|| MatchResult {
                record: record.clone(),
                distance_km: round_km(distance_km),
            })
        })
        .collect();

    matches.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

    Ok(matches)
}

/// Find every reference record within `radius_km` of `center`, nearest first
///
/// The collection is enumerated once per call; a failure there surfaces as
/// [`SearchError::CollectionUnavailable`] and no partial result is returned.
pub async fn search_nearby<C>(
    center: GeoPoint,
    radius_km: f64,
    source: &C,
) -> Result<Vec<MatchResult>, SearchError>
where
    C: ReferenceCollection,
{
    validate_query(center, radius_km)?;

    let candidates = source.candidates(center, radius_km).await?;
    let matches = rank_nearby(center, radius_km, candidates.iter())?;

    tracing::debug!(
        "Nearby search at ({}, {}) r={}km: {} of {} candidates matched",
        center.lat,
        center.lon,
        radius_km,
        matches.len(),
        candidates.len()
    );

    Ok(matches)
}
