//! pulsegate gateway library entry.
//!
//! This crate wires the instrumented route table, config, built-in services,
//! and the axum surface into a cohesive host stack. It is intended to be
//! consumed by the binary (`main.rs`) and by integration tests.

pub mod app_state;
pub mod config;
pub mod host;
pub mod router;
pub mod services;
