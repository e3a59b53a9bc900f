pub mod config;
pub mod run;
pub mod service;
pub mod store;
pub mod telemetry;
