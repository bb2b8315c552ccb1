//! Handler instrumentation, configured once at registration time.
//!
//! [`InstrumentationFeature::configure`] inspects a handler's markers,
//! resolves their metric identifiers, and manufactures the interceptor set
//! the host drives at request time. Marker inspection never happens on the
//! request path.

pub mod interceptor;

pub use interceptor::{
    ExceptionMeteredInterceptor, MeteredInterceptor, RequestScope, ScopedValue, TimedInterceptor,
    IN_FLIGHT_KEY,
};

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;

use crate::error::BoxError;
use crate::marker::{HandlerDescriptor, Marker};
use crate::naming;
use crate::registry::MetricRegistry;
use crate::Result;

/// The full interceptor set manufactured for one handler.
#[derive(Default)]
pub struct HandlerInstrumentation {
    timed: Option<TimedInterceptor>,
    metered: Option<MeteredInterceptor>,
    exception_metered: Option<ExceptionMeteredInterceptor>,
}

impl std::fmt::Debug for HandlerInstrumentation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerInstrumentation")
            .field("timed", &self.timed.is_some())
            .field("metered", &self.metered.is_some())
            .field("exception_metered", &self.exception_metered.is_some())
            .finish()
    }
}

impl HandlerInstrumentation {
    /// Request-entry hook. Counts the attempt first, then starts the timer,
    /// so the rate counter reflects every attempt even if timing setup fails.
    pub fn on_entry(&self, scope: &mut dyn RequestScope) {
        if let Some(metered) = &self.metered {
            metered.on_entry();
        }
        if let Some(timed) = &self.timed {
            timed.on_entry(scope);
        }
    }

    /// Request-exit hook. Must run exactly once per dispatched request, on
    /// success and failure alike.
    pub fn on_exit(&self, scope: &mut dyn RequestScope) {
        if let Some(timed) = &self.timed {
            timed.on_exit(scope);
        }
    }

    /// Wrap the actual handler invocation. Without an exception-metered
    /// marker this is a plain passthrough.
    pub async fn invoke<T, F>(&self, fut: F) -> std::result::Result<T, BoxError>
    where
        F: Future<Output = std::result::Result<T, BoxError>>,
    {
        match &self.exception_metered {
            Some(wrapper) => wrapper.invoke_async(fut).await,
            None => fut.await,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.timed.is_none() && self.metered.is_none() && self.exception_metered.is_none()
    }
}

/// Inspects handler markers once and manufactures interceptors.
///
/// The registry is constructed explicitly at startup and injected here; one
/// feature instance serves the whole process. Configuring the same handler
/// twice returns the originally manufactured interceptor set and creates no
/// duplicate registry entries.
pub struct InstrumentationFeature {
    registry: Arc<MetricRegistry>,
    configured: DashMap<String, Arc<HandlerInstrumentation>>,
}

impl InstrumentationFeature {
    pub fn new(registry: Arc<MetricRegistry>) -> Self {
        Self {
            registry,
            configured: DashMap::new(),
        }
    }

    pub fn registry(&self) -> Arc<MetricRegistry> {
        Arc::clone(&self.registry)
    }

    /// Configure one handler from its static markers.
    ///
    /// A marked handler whose identity cannot be resolved fails here, at
    /// registration time, never at request time.
    pub fn configure(&self, desc: &HandlerDescriptor) -> Result<Arc<HandlerInstrumentation>> {
        if desc.markers.is_empty() {
            return Ok(Arc::new(HandlerInstrumentation::default()));
        }

        let key = naming::base_name(desc)?;
        if let Some(existing) = self.configured.get(&key) {
            return Ok(existing.value().clone());
        }

        let mut instr = HandlerInstrumentation::default();
        for marker in &desc.markers {
            match marker {
                Marker::Timed { name, absolute } => {
                    let id = naming::resolve(name, *absolute, desc)?;
                    instr.timed = Some(TimedInterceptor::new(self.registry.timer(&id)));
                    tracing::debug!(metric = %id, "timed marker configured");
                }
                Marker::Metered { name, absolute } => {
                    let id = naming::resolve(name, *absolute, desc)?;
                    instr.metered = Some(MeteredInterceptor::new(self.registry.meter(&id)));
                    tracing::debug!(metric = %id, "metered marker configured");
                }
                Marker::ExceptionMetered {
                    name,
                    absolute,
                    cause,
                } => {
                    let id = naming::resolve(name, *absolute, desc)?;
                    instr.exception_metered = Some(ExceptionMeteredInterceptor::new(
                        self.registry.meter(&id),
                        cause.clone(),
                    ));
                    tracing::debug!(metric = %id, trigger = cause.trigger(), "exception marker configured");
                }
            }
        }

        // Two racing configure calls settle on one instance.
        Ok(self
            .configured
            .entry(key)
            .or_insert_with(|| Arc::new(instr))
            .value()
            .clone())
    }
}
