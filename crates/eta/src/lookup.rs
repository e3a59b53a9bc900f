use crate::{GeoPoint, Result, VehicleFix};
use std::sync::Arc;

/// How many nearest vehicles an ETA is averaged over.
pub const NEAREST_VEHICLE_COUNT: usize = 3;

/// A spatial store able to answer "k nearest available vehicles" queries.
///
/// Implementations must:
///
/// - return at most `k` fixes, ordered by ascending distance to `point`;
/// - only return vehicles that are currently available;
/// - be callable concurrently from many tasks;
/// - report connectivity or query failures as [`Error::Lookup`].
///
/// The calculator bounds every call with its own deadline, so implementations
/// do not need to enforce one themselves.
///
/// [`Error::Lookup`]: crate::Error::Lookup
pub trait NearestVehicleLookup: Send + Sync {
    /// Returns up to `k` available vehicles closest to `point`.
    fn nearest(
        &self,
        point: GeoPoint,
        k: usize,
    ) -> impl Future<Output = Result<Vec<VehicleFix>>> + Send;
}

impl<L: NearestVehicleLookup> NearestVehicleLookup for Arc<L> {
    fn nearest(
        &self,
        point: GeoPoint,
        k: usize,
    ) -> impl Future<Output = Result<Vec<VehicleFix>>> + Send {
        (**self).nearest(point, k)
    }
}
