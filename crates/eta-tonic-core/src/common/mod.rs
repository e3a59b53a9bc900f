pub mod error;
pub mod types;

pub use error::{Error, Result};

/// gRPC service and message definitions generated from `proto/eta.proto`.
///
/// - [`EtaRequest`](proto::EtaRequest): the point to estimate for, in degrees.
/// - [`EtaReply`](proto::EtaReply): the ETA in minutes.
/// - `eta_estimator_server` / `eta_estimator_client`: generated service
///   bindings.
pub mod proto {
    tonic::include_proto!("eta");

    /// Encoded descriptor set used to serve gRPC reflection.
    pub const FILE_DESCRIPTOR_SET: &[u8] = tonic::include_file_descriptor_set!("eta_descriptor");
}
