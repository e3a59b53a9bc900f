//! gRPC service implementation.
//!
//! - [`handler`] - the `EtaEstimator` implementation (`EtaService`) and its
//!   compression-enabled server wrapper.

pub mod handler;
