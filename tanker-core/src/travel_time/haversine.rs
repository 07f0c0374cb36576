//! Great-circle distance.

use geo::Coord;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres between two WGS84 coordinates
/// (`x = longitude`, `y = latitude`).
///
/// # Examples
/// ```
/// use geo::Coord;
/// use tanker_core::haversine_km;
///
/// let km = haversine_km(Coord { x: 0.0, y: 0.0 }, Coord { x: 0.0, y: 1.0 });
/// assert!((km - 111.19).abs() < 0.01);
/// ```
#[must_use]
pub fn haversine_km(from: Coord<f64>, to: Coord<f64>) -> f64 {
    let d_lat = (to.y - from.y).to_radians();
    let d_lon = (to.x - from.x).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + from.y.to_radians().cos() * to.y.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn identical_points_are_zero_apart() {
        let point = Coord { x: 8.5, y: 47.3 };
        assert!(haversine_km(point, point).abs() < f64::EPSILON);
    }

    #[rstest]
    fn distance_is_symmetric() {
        let a = Coord { x: -0.1276, y: 51.5072 };
        let b = Coord { x: 2.3522, y: 48.8566 };
        assert!((haversine_km(a, b) - haversine_km(b, a)).abs() < 1e-9);
        // London to Paris.
        assert!((haversine_km(a, b) - 343.5).abs() < 1.0);
    }
}
