//! Library half of the `eta-axum` gateway binary, exposed so the router can
//! be driven in-process by tests.

pub mod gateway;
