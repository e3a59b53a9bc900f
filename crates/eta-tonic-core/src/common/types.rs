//! # Shared ETA Protocol Types and Constants
//!
//! Conversions between the wire messages in [`crate::proto`] and the domain
//! types in [`eta`], plus the defaults both the server and its clients agree
//! on.
//!
//! Converting an [`EtaRequest`] into a [`GeoPoint`] is the RPC ingress check:
//! it goes through [`GeoPoint::new`], so out-of-range or non-finite
//! coordinates never reach the cache or the calculator.

use crate::proto::{EtaReply, EtaRequest};
use eta::GeoPoint;

/// Port the ETA service listens on unless configured otherwise.
pub const DEFAULT_SERVICE_PORT: u16 = 4568;

/// Fully qualified gRPC service name, as registered with health checks.
pub const SERVICE_NAME: &str = "eta.EtaEstimator";

/// Joins a host and port into an address string, bracketing IPv6 literals.
///
/// ```
/// use eta_tonic_core::types::join_host_port;
///
/// assert_eq!(join_host_port("0.0.0.0", 4568), "0.0.0.0:4568");
/// assert_eq!(join_host_port("::1", 4568), "[::1]:4568");
/// ```
pub fn join_host_port(host: &str, port: u16) -> String {
    if host.contains(':') && !host.starts_with('[') {
        format!("[{host}]:{port}")
    } else {
        format!("{host}:{port}")
    }
}

impl From<GeoPoint> for EtaRequest {
    fn from(point: GeoPoint) -> Self {
        Self {
            latitude: point.latitude(),
            longitude: point.longitude(),
        }
    }
}

impl TryFrom<EtaRequest> for GeoPoint {
    type Error = eta::Error;

    fn try_from(req: EtaRequest) -> Result<Self, Self::Error> {
        Self::new(req.latitude, req.longitude)
    }
}

impl From<f64> for EtaReply {
    fn from(eta: f64) -> Self {
        Self { eta }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_round_trips_through_geo_point() {
        let point = GeoPoint::new(55.751244, 37.618423).unwrap();
        let req = EtaRequest::from(point);
        assert_eq!(GeoPoint::try_from(req).unwrap(), point);
    }

    #[test]
    fn host_port_joining() {
        assert_eq!(join_host_port("localhost", 80), "localhost:80");
        assert_eq!(join_host_port("[::]", 4568), "[::]:4568");
        assert_eq!(join_host_port("::", 4568), "[::]:4568");
    }

    #[test]
    fn out_of_range_request_is_rejected() {
        let req = EtaRequest {
            latitude: 91.0,
            longitude: 0.0,
        };
        assert!(matches!(
            GeoPoint::try_from(req),
            Err(eta::Error::InvalidCoordinates { .. })
        ));
    }
}
