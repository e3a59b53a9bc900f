//! Geographic primitives and great-circle distance.
//!
//! [`GeoPoint`] can only be built through [`GeoPoint::new`], which enforces
//! the latitude/longitude bounds. Every ingress point (HTTP and RPC) goes
//! through that constructor, so code holding a `GeoPoint` never re-validates.

use crate::{Error, Result};

/// Mean Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Largest accepted absolute latitude, in degrees.
pub const MAX_LATITUDE: f64 = 90.0;

/// Largest accepted absolute longitude, in degrees.
pub const MAX_LONGITUDE: f64 = 180.0;

/// A validated point on the globe, in degrees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPoint {
    latitude: f64,
    longitude: f64,
}

impl GeoPoint {
    /// Creates a point after checking both coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCoordinates`] if `latitude` is outside
    /// `[-90, 90]`, `longitude` is outside `[-180, 180]`, or either value is
    /// not finite.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let lat_ok = (-MAX_LATITUDE..=MAX_LATITUDE).contains(&latitude);
        let lon_ok = (-MAX_LONGITUDE..=MAX_LONGITUDE).contains(&longitude);
        if !(lat_ok && lon_ok) {
            return Err(Error::InvalidCoordinates {
                latitude,
                longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Latitude in degrees.
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Longitude in degrees.
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// A single nearest-neighbour result: where an available vehicle currently is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VehicleFix {
    pub position: GeoPoint,
}

impl From<GeoPoint> for VehicleFix {
    fn from(position: GeoPoint) -> Self {
        Self { position }
    }
}

/// Great-circle distance between `a` and `b` on a sphere of
/// [`EARTH_RADIUS_KM`].
pub fn distance_km(a: GeoPoint, b: GeoPoint) -> f64 {
    distance_with_radius(a, b, EARTH_RADIUS_KM)
}

/// Great-circle distance between `a` and `b` using the haversine formula.
///
/// See <https://en.wikipedia.org/wiki/Haversine_formula>. The result has the
/// same unit as `radius`.
pub fn distance_with_radius(a: GeoPoint, b: GeoPoint, radius: f64) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = lat2 - lat1;
    let delta_lon = b.longitude.to_radians() - a.longitude.to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);

    // `h` may drift just above 1.0 for antipodal points.
    2.0 * radius * h.sqrt().min(1.0).asin()
}
