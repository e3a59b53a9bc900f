use crate::{EARTH_RADIUS_KM, Error, GeoPoint, NearestVehicleLookup, Result, TimeSource, VehicleFix};
use core::time::Duration;
use std::sync::{
    Arc,
    atomic::{AtomicU64, AtomicUsize, Ordering},
};

/// A point `km` kilometers east of `origin` along its parallel. Exact
/// great-circle distance only on the equator.
pub fn fix_east_of(origin: GeoPoint, km: f64) -> VehicleFix {
    let longitude = origin.longitude() + (km / EARTH_RADIUS_KM).to_degrees();
    GeoPoint::new(origin.latitude(), longitude).unwrap().into()
}

/// Returns the same fixes for every query and counts calls.
pub struct FixedLookup {
    fixes: Vec<VehicleFix>,
    calls: AtomicUsize,
    last_k: AtomicUsize,
}

impl FixedLookup {
    pub fn new(fixes: Vec<VehicleFix>) -> Self {
        Self {
            fixes,
            calls: AtomicUsize::new(0),
            last_k: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requested_k(&self) -> Option<usize> {
        match self.last_k.load(Ordering::SeqCst) {
            0 => None,
            k => Some(k),
        }
    }
}

impl NearestVehicleLookup for FixedLookup {
    async fn nearest(&self, _point: GeoPoint, k: usize) -> Result<Vec<VehicleFix>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.last_k.store(k, Ordering::SeqCst);
        Ok(self.fixes.iter().take(k).copied().collect())
    }
}

pub struct FailingLookup {
    context: String,
}

impl FailingLookup {
    pub fn new(context: &str) -> Self {
        Self {
            context: context.to_string(),
        }
    }
}

impl NearestVehicleLookup for FailingLookup {
    async fn nearest(&self, _point: GeoPoint, _k: usize) -> Result<Vec<VehicleFix>> {
        Err(Error::Lookup {
            context: self.context.clone(),
        })
    }
}

pub struct SlowLookup {
    delay: Duration,
}

impl SlowLookup {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

impl NearestVehicleLookup for SlowLookup {
    async fn nearest(&self, point: GeoPoint, _k: usize) -> Result<Vec<VehicleFix>> {
        tokio::time::sleep(self.delay).await;
        Ok(vec![point.into()])
    }
}

/// Manually advanced clock shared between a test and the cache under test.
#[derive(Clone, Default)]
pub struct MockTime {
    millis: Arc<AtomicU64>,
}

impl MockTime {
    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_millis()).unwrap();
        self.millis.fetch_add(by, Ordering::SeqCst);
    }
}

impl TimeSource for MockTime {
    fn current_millis(&self) -> u64 {
        self.millis.load(Ordering::SeqCst)
    }
}
