//! Library half of the `eta-tonic-server` binary.
//!
//! Exposed so the gateway's integration tests and the benches can run the
//! real service in-process against a mocked vehicle lookup.

pub mod server;
