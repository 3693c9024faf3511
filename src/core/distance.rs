use crate::models::BoundingBox;

/// Earth's radius in kilometers
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculate the Haversine distance between two points in kilometers
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
///
/// # Returns
/// Distance in kilometers. Exactly `0.0` for identical points and
/// bit-for-bit symmetric in its two points. Out-of-range or NaN inputs
/// are not validated and propagate into the result.
#[inline]
pub fn haversine_distance(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    // abs() so swapping the points cannot change a single bit of the result
    let delta_lat = (lat2 - lat1).abs().to_radians();
    let delta_lon = (lon2 - lon1).abs().to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Round a distance to one decimal place for display
#[inline]
pub fn round_distance(distance_km: f64) -> f64 {
    (distance_km * 10.0).round() / 10.0
}

/// Calculate a bounding box around a center point
///
/// Used as a coarse storage-side prefilter before the exact Haversine check.
/// 1° latitude ≈ 111km, 1° longitude ≈ 111km * cos(latitude)
pub fn calculate_bounding_box(lat: f64, lon: f64, radius_km: f64) -> BoundingBox {
    let lat_delta = radius_km / 111.0;
    let lon_delta = radius_km / (111.0 * lat.to_radians().cos().abs());

    BoundingBox {
        min_lat: lat - lat_delta,
        max_lat: lat + lat_delta,
        min_lon: lon - lon_delta,
        max_lon: lon + lon_delta,
    }
}

/// Check if a point is within a bounding box
#[inline]
pub fn is_within_bounding_box(lat: f64, lon: f64, bbox: &BoundingBox) -> bool {
    lat >= bbox.min_lat && lat <= bbox.max_lat && lon >= bbox.min_lon && lon <= bbox.max_lon
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_haversine_distance() {
        // Mangaluru to Bengaluru is roughly 300 km as the crow flies
        let distance = haversine_distance(12.9141, 74.8560, 12.9716, 77.5946);
        assert!((distance - 297.0).abs() < 10.0, "Distance should be ~297km, got {}", distance);
    }

    #[test]
    fn test_same_point_is_exactly_zero() {
        assert_eq!(haversine_distance(12.9, 74.8, 12.9, 74.8), 0.0);
        assert_eq!(haversine_distance(-33.86, 151.2, -33.86, 151.2), 0.0);
    }

    #[test]
    fn test_symmetric() {
        let pairs = [
            (12.9, 74.8, 13.0, 74.9),
            (51.5074, -0.1278, 48.8566, 2.3522),
            (-45.0, 170.0, 45.0, -170.0),
        ];
        for (a, b, c, d) in pairs {
            assert_eq!(haversine_distance(a, b, c, d), haversine_distance(c, d, a, b));
        }
    }

    #[test]
    fn test_short_hop_is_small() {
        let km = haversine_distance(12.9, 74.8, 13.0, 74.9);
        assert!(km > 0.0 && km < 50.0);
    }

    #[test]
    fn test_round_distance() {
        assert_eq!(round_distance(2.04), 2.0);
        assert_eq!(round_distance(2.06), 2.1);
        assert_eq!(round_distance(0.0), 0.0);
    }

    #[test]
    fn test_point_within_bbox() {
        let bbox = calculate_bounding_box(12.9, 74.8, 10.0);

        assert!(is_within_bounding_box(12.9, 74.8, &bbox));
        assert!(is_within_bounding_box(12.95, 74.85, &bbox));
        assert!(!is_within_bounding_box(13.9, 74.8, &bbox));

        let lat_span = bbox.max_lat - bbox.min_lat;
        assert!((lat_span - 0.18).abs() < 0.02, "Lat span should be ~0.18 degrees");
    }
}
