//! Error types for the ETA RPC boundary.
//!
//! This module defines the `Error` enum returned by the gRPC handler and its
//! mapping onto `tonic::Status`, so callers can tell client mistakes, domain
//! conditions and infrastructure failures apart by status code alone.
//!
//! ## Error Cases
//! - `Eta`: anything raised by the ETA engine (bad coordinates, empty fleet,
//!   store failure, lookup timeout).
//! - `InvalidRequest`: the request was malformed before reaching the engine.
//! - `ServiceShutdown`: a request arrived while the service was shutting down.

use eta::Error as EtaError;
use tonic::Status;

pub type Result<T> = core::result::Result<T, Error>;

/// Unified error type for the ETA service.
#[derive(Clone, thiserror::Error, Debug)]
pub enum Error {
    /// The ETA engine rejected or failed the request.
    #[error(transparent)]
    Eta(#[from] EtaError),

    /// The client request was invalid.
    #[error("Invalid request: {reason}")]
    InvalidRequest { reason: String },

    /// The service is in the process of shutting down.
    #[error("Service is shutting down")]
    ServiceShutdown,
}

impl From<Error> for Status {
    fn from(err: Error) -> Self {
        match err {
            Error::Eta(e @ EtaError::InvalidCoordinates { .. }) => {
                Status::invalid_argument(e.to_string())
            }
            Error::Eta(e @ EtaError::NoVehiclesAvailable) => {
                Status::failed_precondition(e.to_string())
            }
            Error::Eta(e @ (EtaError::Lookup { .. } | EtaError::LookupTimeout { .. })) => {
                Status::unavailable(e.to_string())
            }
            Error::InvalidRequest { reason } => Status::invalid_argument(reason),
            Error::ServiceShutdown => Status::unavailable("Service is shutting down"),
        }
    }
}
