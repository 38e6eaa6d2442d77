use serde::{Deserialize, Serialize};

/// Mean Earth radius used for great-circle distances, in kilometres
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point on the Earth's surface in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance to another point, in kilometres
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        great_circle_distance_km(self.lat, self.lng, other.lat, other.lng)
    }
}

/// Great-circle distance via the spherical law of cosines.
///
/// Rounding can push the cosine fractionally outside [-1, 1] for coincident or
/// antipodal points, so it is clamped before `acos`. Identical points are
/// short-circuited to exactly zero.
pub fn great_circle_distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    if lat1 == lat2 && lng1 == lng2 {
        return 0.0;
    }

    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_lambda = lng2.to_radians() - lng1.to_radians();

    let cos_angle = phi1.cos() * phi2.cos() * delta_lambda.cos() + phi1.sin() * phi2.sin();

    EARTH_RADIUS_KM * cos_angle.clamp(-1.0, 1.0).acos()
}

/// Anything with a position that can be ranked by distance
pub trait Located {
    fn coordinates(&self) -> Coordinates;
}

/// Order `candidates` by ascending distance from `origin` and keep the first `limit`.
///
/// The sort is stable: candidates at the same distance keep their input order.
pub fn rank_by_distance<T: Located>(
    origin: Coordinates,
    candidates: Vec<T>,
    limit: usize,
) -> Vec<(T, f64)> {
    let mut ranked: Vec<(T, f64)> = candidates
        .into_iter()
        .map(|candidate| {
            let distance = origin.distance_km(&candidate.coordinates());
            (candidate, distance)
        })
        .collect();

    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
    ranked.truncate(limit);
    ranked
}
