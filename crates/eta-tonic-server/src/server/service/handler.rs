use crate::server::telemetry::{
    increment_request_errors, increment_requests, record_eta, record_request_duration,
};
use eta_tonic_core::{
    Error,
    eta::{EtaCache, GeoPoint, NearestVehicleLookup},
    proto::{
        EtaReply, EtaRequest,
        eta_estimator_server::{EtaEstimator, EtaEstimatorServer},
    },
};
use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Instant,
};
use tonic::{Request, Response, Status, codec::CompressionEncoding};

/// gRPC front of the ETA engine.
///
/// Every request goes through the shared [`EtaCache`]: coordinates are
/// validated, quantized into a cache key and only computed (one spatial query)
/// on a miss. Clones share the cache and the shutdown flag.
pub struct EtaService<L> {
    cache: Arc<EtaCache<L>>,
    shutting_down: Arc<AtomicBool>,
}

impl<L> Clone for EtaService<L> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            shutting_down: Arc::clone(&self.shutting_down),
        }
    }
}

impl<L: NearestVehicleLookup> EtaService<L> {
    pub fn new(cache: EtaCache<L>) -> Self {
        Self {
            cache: Arc::new(cache),
            shutting_down: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn cache(&self) -> &EtaCache<L> {
        &self.cache
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shutting_down.load(Ordering::Acquire)
    }

    /// Rejects new requests with `UNAVAILABLE`. In-flight requests finish.
    pub fn shutdown(&self) {
        if self.shutting_down.swap(true, Ordering::AcqRel) {
            return;
        }
        let stats = self.cache.stats();
        tracing::info!(
            hits = stats.hits,
            misses = stats.misses,
            entries = self.cache.len(),
            "ETA service stopped accepting requests"
        );
    }

    async fn estimate(&self, req: EtaRequest) -> eta_tonic_core::Result<f64> {
        if self.is_shutting_down() {
            return Err(Error::ServiceShutdown);
        }
        let point = GeoPoint::try_from(req)?;
        Ok(self.cache.get(point).await?)
    }
}

#[tonic::async_trait]
impl<L: NearestVehicleLookup + 'static> EtaEstimator for EtaService<L> {
    /// Answers a single ETA request.
    ///
    /// If `metrics` is enabled, records the request count, error count by
    /// status code, request duration and the returned ETA.
    #[tracing::instrument(
        skip_all,
        fields(latitude = req.get_ref().latitude, longitude = req.get_ref().longitude)
    )]
    async fn eta(&self, req: Request<EtaRequest>) -> Result<Response<EtaReply>, Status> {
        let start = Instant::now();
        increment_requests();

        let result = self.estimate(req.into_inner()).await;
        record_request_duration(start.elapsed().as_secs_f64() * 1000.0);

        match result {
            Ok(eta) => {
                record_eta(eta);
                Ok(Response::new(EtaReply::from(eta)))
            }
            Err(err) => {
                let client_error = matches!(&err, Error::Eta(e) if e.is_client_error());
                if client_error {
                    tracing::debug!(error = %err, "rejected ETA request");
                } else {
                    tracing::error!(error = %err, "ETA request failed");
                }
                let status = Status::from(err);
                increment_request_errors(status.code());
                Err(status)
            }
        }
    }
}

pub fn build_eta_service<L: NearestVehicleLookup + 'static>(
    service: EtaService<L>,
) -> EtaEstimatorServer<EtaService<L>> {
    EtaEstimatorServer::new(service)
        .send_compressed(CompressionEncoding::Zstd)
        .send_compressed(CompressionEncoding::Gzip)
        .accept_compressed(CompressionEncoding::Zstd)
        .accept_compressed(CompressionEncoding::Gzip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::time::Duration;
    use eta_tonic_core::eta::{CacheConfig, EtaCalculator, Result as EtaResult, VehicleFix};
    use std::sync::atomic::AtomicUsize;
    use tonic::Code;

    struct CountingLookup {
        fixes: Vec<VehicleFix>,
        calls: AtomicUsize,
    }

    impl NearestVehicleLookup for CountingLookup {
        async fn nearest(&self, _point: GeoPoint, k: usize) -> EtaResult<Vec<VehicleFix>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.fixes.iter().take(k).copied().collect())
        }
    }

    fn service(fixes: Vec<VehicleFix>) -> EtaService<CountingLookup> {
        let lookup = CountingLookup {
            fixes,
            calls: AtomicUsize::new(0),
        };
        let calculator = EtaCalculator::new(lookup).with_lookup_timeout(Duration::from_secs(1));
        EtaService::new(EtaCache::new(calculator, CacheConfig::default()))
    }

    fn request(latitude: f64, longitude: f64) -> Request<EtaRequest> {
        Request::new(EtaRequest {
            latitude,
            longitude,
        })
    }

    fn lookup_calls(service: &EtaService<CountingLookup>) -> usize {
        service.cache().calculator().lookup().calls.load(Ordering::SeqCst)
    }

    #[tokio::test]
    async fn answers_with_positive_eta() {
        let fix = GeoPoint::new(0.01, 0.0).unwrap().into();
        let service = service(vec![fix]);

        let reply = service.eta(request(0.0, 0.0)).await.unwrap().into_inner();
        assert!(reply.eta > 0.0);
    }

    #[tokio::test]
    async fn invalid_coordinates_skip_the_lookup() {
        let service = service(vec![GeoPoint::new(0.0, 0.0).unwrap().into()]);

        let status = service.eta(request(91.0, 0.0)).await.unwrap_err();
        assert_eq!(status.code(), Code::InvalidArgument);
        assert_eq!(lookup_calls(&service), 0);
    }

    #[tokio::test]
    async fn empty_fleet_is_failed_precondition() {
        let service = service(vec![]);

        let status = service.eta(request(10.0, 10.0)).await.unwrap_err();
        assert_eq!(status.code(), Code::FailedPrecondition);
    }

    #[tokio::test]
    async fn repeated_requests_hit_the_cache() {
        let service = service(vec![GeoPoint::new(1.0, 1.0).unwrap().into()]);

        let first = service.eta(request(1.0001, 1.0001)).await.unwrap();
        let second = service.eta(request(1.0002, 1.0002)).await.unwrap();
        assert_eq!(first.get_ref().eta, second.get_ref().eta);
        assert_eq!(lookup_calls(&service), 1);
    }

    #[tokio::test]
    async fn shutdown_rejects_new_requests() {
        let service = service(vec![GeoPoint::new(1.0, 1.0).unwrap().into()]);
        service.clone().shutdown();

        assert!(service.is_shutting_down());
        let status = service.eta(request(1.0, 1.0)).await.unwrap_err();
        assert_eq!(status.code(), Code::Unavailable);
    }
}
