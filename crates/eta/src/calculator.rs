//! Turns a nearest-vehicle lookup into a single ETA value.
//!
//! The estimate is deliberately crude: the mean great-circle distance to the
//! [`NEAREST_VEHICLE_COUNT`] closest available vehicles, scaled by a constant
//! multiplier. The expensive part is the spatial query, which is why
//! [`EtaCache`](crate::EtaCache) sits in front of this type.

use crate::{
    Error, GeoPoint, NEAREST_VEHICLE_COUNT, NearestVehicleLookup, Result, VehicleFix, distance_km,
    time::duration_to_millis,
};
use core::time::Duration;
use std::time::Instant;

/// Default minutes-per-kilometer scaling factor.
pub const DEFAULT_MULTIPLIER: f64 = 1.5;

/// Default upper bound on a single spatial lookup.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Computes ETAs from a [`NearestVehicleLookup`].
#[derive(Debug)]
pub struct EtaCalculator<L> {
    lookup: L,
    multiplier: f64,
    lookup_timeout: Duration,
}

impl<L: NearestVehicleLookup> EtaCalculator<L> {
    /// Creates a calculator with [`DEFAULT_MULTIPLIER`] and
    /// [`DEFAULT_LOOKUP_TIMEOUT`].
    pub const fn new(lookup: L) -> Self {
        Self {
            lookup,
            multiplier: DEFAULT_MULTIPLIER,
            lookup_timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    /// Sets the minutes-per-kilometer multiplier.
    #[must_use]
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Sets the deadline applied to each spatial lookup.
    #[must_use]
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = timeout;
        self
    }

    pub const fn lookup(&self) -> &L {
        &self.lookup
    }

    pub const fn multiplier(&self) -> f64 {
        self.multiplier
    }

    pub const fn lookup_timeout(&self) -> Duration {
        self.lookup_timeout
    }

    /// Calculates the ETA, in minutes, for vehicles nearest to `point`.
    ///
    /// If the store returns fewer than [`NEAREST_VEHICLE_COUNT`] vehicles,
    /// the mean is taken over those it did return.
    ///
    /// # Errors
    ///
    /// - [`Error::NoVehiclesAvailable`] if the lookup returned nothing.
    /// - [`Error::LookupTimeout`] if the lookup exceeded its deadline.
    /// - Any error produced by the lookup itself, unchanged.
    pub async fn calculate(&self, point: GeoPoint) -> Result<f64> {
        let start = Instant::now();

        let fixes = tokio::time::timeout(
            self.lookup_timeout,
            self.lookup.nearest(point, NEAREST_VEHICLE_COUNT),
        )
        .await
        .map_err(|_| Error::LookupTimeout {
            timeout_ms: duration_to_millis(self.lookup_timeout),
        })??;

        let mean = mean_distance_km(point, &fixes).ok_or(Error::NoVehiclesAvailable)?;
        let eta = mean * self.multiplier;

        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        tracing::info!(
            eta,
            elapsed_ms,
            vehicles = fixes.len(),
            "ETA of {eta:.2} minutes was calculated in {elapsed_ms:.1} ms"
        );
        Ok(eta)
    }
}

/// Mean distance from `point` to each fix, or `None` when there are no fixes.
fn mean_distance_km(point: GeoPoint, fixes: &[VehicleFix]) -> Option<f64> {
    if fixes.is_empty() {
        return None;
    }
    let total: f64 = fixes
        .iter()
        .map(|fix| distance_km(point, fix.position))
        .sum();
    Some(total / fixes.len() as f64)
}
