//! Per-thread gRPC clients for the ETA service.
//!
//! Each runtime worker thread lazily builds its own channel the first time it
//! serves a request for a given upstream URI, then reuses it. Channels are
//! never shared across threads, so there is no pool to contend on. A channel
//! spawns its connection task on the runtime that created it; keep one
//! runtime per process.

use crate::gateway::error::UpstreamError;
use core::{cell::RefCell, time::Duration};
use eta_tonic_core::{
    eta::GeoPoint,
    proto::{EtaRequest, eta_estimator_client::EtaEstimatorClient},
};
use std::collections::HashMap;
use tonic::{
    Request,
    transport::{Channel, Endpoint, Uri},
};

thread_local! {
    static CLIENTS: RefCell<HashMap<String, EtaEstimatorClient<Channel>>> =
        RefCell::new(HashMap::new());
}

/// Handle for calling `eta.EtaEstimator/Eta` with a deadline.
///
/// Cheap to clone. The handle itself holds no connection, only the endpoint
/// settings used to build one per thread.
#[derive(Clone, Debug)]
pub struct EtaClient {
    key: String,
    endpoint: Endpoint,
    timeout: Duration,
}

impl EtaClient {
    pub fn new(uri: Uri, timeout: Duration, connect_timeout: Duration) -> Self {
        let key = uri.to_string();
        let endpoint = Endpoint::from(uri)
            .connect_timeout(connect_timeout)
            .tcp_nodelay(true);
        Self {
            key,
            endpoint,
            timeout,
        }
    }

    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// This thread's client for the upstream, created on first use.
    fn client(&self) -> EtaEstimatorClient<Channel> {
        CLIENTS.with(|clients| {
            clients
                .borrow_mut()
                .entry(self.key.clone())
                .or_insert_with(|| {
                    tracing::debug!(upstream = %self.key, "creating ETA service channel");
                    EtaEstimatorClient::new(self.endpoint.connect_lazy())
                })
                .clone()
        })
    }

    /// Asks the ETA service for the ETA at `point`, in minutes.
    ///
    /// The deadline is enforced locally and also sent as `grpc-timeout` so the
    /// server can stop work the gateway no longer waits for.
    ///
    /// # Errors
    ///
    /// [`UpstreamError::Timeout`] when the deadline elapses on either side,
    /// [`UpstreamError::Failed`] for any other non-OK status, including the
    /// service's own store timing out.
    pub async fn eta(&self, point: GeoPoint) -> Result<f64, UpstreamError> {
        let timeout_ms = duration_to_millis(self.timeout);
        let mut client = self.client();

        let mut request = Request::new(EtaRequest::from(point));
        request.set_timeout(self.timeout);

        match tokio::time::timeout(self.timeout, client.eta(request)).await {
            Ok(Ok(reply)) => Ok(reply.into_inner().eta),
            Ok(Err(status)) => Err(UpstreamError::from_status(&status, timeout_ms)),
            Err(_) => Err(UpstreamError::Timeout { timeout_ms }),
        }
    }
}

fn duration_to_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(uri: &str) -> EtaClient {
        EtaClient::new(
            uri.parse().unwrap(),
            Duration::from_millis(500),
            Duration::from_millis(200),
        )
    }

    #[tokio::test]
    async fn channels_are_cached_per_upstream() {
        let a = client("http://127.0.0.1:50001");
        let b = client("http://127.0.0.1:50002");

        a.client();
        a.clone().client();
        b.client();

        CLIENTS.with(|clients| assert_eq!(clients.borrow().len(), 2));
    }

    #[tokio::test]
    async fn unreachable_upstream_is_a_failure() {
        let point = GeoPoint::new(10.0, 10.0).unwrap();

        let err = client("http://127.0.0.1:1").eta(point).await.unwrap_err();
        assert!(
            matches!(err, UpstreamError::Failed { .. }),
            "unexpected {err:?}"
        );
    }

    #[test]
    fn oversized_durations_saturate() {
        assert_eq!(duration_to_millis(Duration::from_millis(1500)), 1500);
        assert_eq!(duration_to_millis(Duration::MAX), u64::MAX);
    }
}
