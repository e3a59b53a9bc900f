#![doc = include_str!("../README.md")]

mod cache;
mod calculator;
mod error;
mod geo;
mod lookup;
#[cfg(test)]
mod testing;
mod time;

pub use cache::{
    CacheConfig, CacheKey, CacheStats, DEFAULT_EXPIRATION, DEFAULT_MAX_ENTRIES, DEFAULT_PRECISION,
    EtaCache, MAX_PRECISION, Operation,
};
pub use calculator::{DEFAULT_LOOKUP_TIMEOUT, DEFAULT_MULTIPLIER, EtaCalculator};
pub use error::{Error, Result};
pub use geo::{
    EARTH_RADIUS_KM, GeoPoint, MAX_LATITUDE, MAX_LONGITUDE, VehicleFix, distance_km,
    distance_with_radius,
};
pub use lookup::{NEAREST_VEHICLE_COUNT, NearestVehicleLookup};
pub use time::{MonotonicClock, TimeSource};
