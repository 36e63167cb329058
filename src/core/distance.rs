use crate::models::{BoundingBox, GeoPoint};
use std::f64::consts::FRAC_PI_2;

/// Earth's mean radius in kilometers (spherical model)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Angular slack added to bounding boxes so float error never drops a point
/// sitting exactly on the search radius (~6mm)
const BOX_MARGIN_RAD: f64 = 1e-9;

/// Great-circle distance between two points in kilometers
#[inline]
pub fn haversine(center: GeoPoint, point: GeoPoint) -> f64 {
    haversine_distance(center.lat, center.lon, point.lat, point.lon)
}

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    // Rounding can push `a` just past 1.0 for antipodal pairs
    let a = a.clamp(0.0, 1.0);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Calculate a bounding box that contains every point within `radius_km` of `center`
///
/// Uses the exact spherical extent of the circle, so it is safe for pruning:
/// latitude spans `±radius/R`, longitude spans `±asin(sin(δ) / cos(φ))`.
/// When the circle reaches a pole the box covers all longitudes.
pub fn calculate_bounding_box(center: GeoPoint, radius_km: f64) -> BoundingBox {
    let delta = radius_km / EARTH_RADIUS_KM + BOX_MARGIN_RAD;
    let lat = center.lat.to_radians();
    let lon = center.lon.to_radians();

    let min_lat = lat - delta;
    let max_lat = lat + delta;

    if min_lat > -FRAC_PI_2 && max_lat < FRAC_PI_2 {
        let delta_lon = (delta.sin() / lat.cos()).min(1.0).asin();
        BoundingBox {
            min_lat: min_lat.to_degrees(),
            max_lat: max_lat.to_degrees(),
            min_lon: (lon - delta_lon).to_degrees(),
            max_lon: (lon + delta_lon).to_degrees(),
        }
    } else {
        BoundingBox {
            min_lat: min_lat.to_degrees().max(-90.0),
            max_lat: max_lat.to_degrees().min(90.0),
            min_lon: -180.0,
            max_lon: 180.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::HaversineDistance;
    use std::f64::consts::PI;

    fn point(lat: f64, lon: f64) -> GeoPoint {
        GeoPoint { lat, lon }
    }

    #[test]
    fn test_haversine_distance() {
        // Distance from London to Paris (approximately 344 km)
        let london_lat = 51.5074;
        let london_lon = -0.1278;
        let paris_lat = 48.8566;
        let paris_lon = 2.3522;

        let distance = haversine_distance(london_lat, london_lon, paris_lat, paris_lon);
        assert!((distance - 344.0).abs() < 10.0, "Distance should be ~344km, got {}", distance);
    }

    #[test]
    fn test_same_point_is_zero() {
        let p = point(48.8584, 2.2945);
        assert_eq!(haversine(p, p), 0.0);
    }

    #[test]
    fn test_antipodal_distance() {
        let distance = haversine(point(0.0, 0.0), point(0.0, 180.0));
        assert!((distance - PI * EARTH_RADIUS_KM).abs() < 1e-6, "got {}", distance);

        let distance = haversine(point(90.0, 0.0), point(-90.0, 0.0));
        assert!((distance - 20015.0).abs() < 1.0, "got {}", distance);
    }

    #[test]
    fn test_antipodal_sweep_is_finite() {
        let half_circumference = PI * EARTH_RADIUS_KM;

        for lat_step in -900..=900 {
            let lat = lat_step as f64 * 0.1;
            for lon_step in (-1800..=0).step_by(25) {
                let lon = lon_step as f64 * 0.1;
                let distance = haversine(point(lat, lon), point(-lat, lon + 180.0));

                assert!(distance.is_finite(), "({}, {}) gave {}", lat, lon, distance);
                assert!((distance - half_circumference).abs() < 1e-3, "({}, {}) gave {}", lat, lon, distance);
            }
        }

        let distance = haversine(point(-87.5, -180.0), point(87.5, 0.0));
        assert!((distance - half_circumference).abs() < 1e-3, "got {}", distance);
    }

    #[test]
    fn test_agrees_with_geo_crate() {
        // geo uses the IUGG mean radius (6371.0088 km), so allow a relative slack
        let a = point(40.6892, -74.0445);
        let b = point(48.8584, 2.2945);

        let ours = haversine(a, b);
        let theirs = geo::Point::<f64>::from(a).haversine_distance(&geo::Point::<f64>::from(b)) / 1000.0;

        assert!((ours - theirs).abs() / theirs < 1e-5, "ours {} vs geo {}", ours, theirs);
    }

    #[test]
    fn test_bounding_box_contains_circle() {
        let center = point(60.0, 10.0);
        let radius_km = 1111.95; // ~10 degrees of arc
        let bbox = calculate_bounding_box(center, radius_km);

        assert!((bbox.max_lat - 70.0).abs() < 0.01);
        assert!((bbox.min_lat - 50.0).abs() < 0.01);
        // At 60N the longitude extent is wider than radius / cos(lat) suggests
        assert!(bbox.max_lon - 10.0 > 20.0, "lon span {}", bbox.max_lon - 10.0);

        // Sweep the circle boundary and check every point is inside the box
        for step in 0..360 {
            let bearing = (step as f64).to_radians();
            let delta = radius_km / EARTH_RADIUS_KM;
            let lat1 = center.lat.to_radians();
            let lat2 = (lat1.sin() * delta.cos() + lat1.cos() * delta.sin() * bearing.cos()).asin();
            let lon2 = center.lon.to_radians()
                + (bearing.sin() * delta.sin() * lat1.cos())
                    .atan2(delta.cos() - lat1.sin() * lat2.sin());
            let (lat2, lon2) = (lat2.to_degrees(), lon2.to_degrees());

            assert!(lat2 >= bbox.min_lat && lat2 <= bbox.max_lat, "bearing {}", step);
            assert!(lon2 >= bbox.min_lon && lon2 <= bbox.max_lon, "bearing {}", step);
        }
    }

    #[test]
    fn test_bounding_box_over_pole() {
        let bbox = calculate_bounding_box(point(89.0, 0.0), 500.0);

        assert_eq!(bbox.max_lat, 90.0);
        assert_eq!(bbox.min_lon, -180.0);
        assert_eq!(bbox.max_lon, 180.0);
    }

    #[test]
    fn test_bounding_box_crosses_antimeridian() {
        let bbox = calculate_bounding_box(point(0.0, 179.5), 200.0);
        assert!(bbox.max_lon > 180.0);
        assert!(bbox.min_lon < 179.5);
    }
}
