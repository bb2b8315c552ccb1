//! pulsegate core: handler markers, metric-identity resolution, the shared
//! metric registry, and the per-request interceptors.
//!
//! This crate carries no transport or runtime dependencies. The host (see the
//! gateway crate) registers handlers described by [`marker::HandlerDescriptor`]
//! through [`instrument::InstrumentationFeature`] at startup, then drives the
//! manufactured interceptors from its own request lifecycle.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! Configuration problems surface as `PulsegateError` at registration time;
//! failures inside request-time instrumentation are logged and swallowed so
//! the request pipeline is never disturbed.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod instrument;
pub mod marker;
pub mod naming;
pub mod registry;

/// Shared result type.
pub use error::{BoxError, PulsegateError, Result};
