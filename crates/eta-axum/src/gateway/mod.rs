//! HTTP front door for the ETA service.
//!
//! - [`config`] - CLI/environment configuration.
//! - [`client`] - per-thread gRPC client with a call deadline.
//! - [`error`] - upstream and validation errors and their HTTP responses.
//! - [`routes`] - the `GET /` handler and router.
//! - [`telemetry`] - log subscriber setup.

pub mod client;
pub mod config;
pub mod error;
pub mod routes;
pub mod telemetry;
