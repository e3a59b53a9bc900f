#![doc = include_str!("../README.md")]

mod common;
pub use common::*;
// Public re-export so downstream crates can access `eta` via
// `eta_tonic_core::eta`
pub use eta;
