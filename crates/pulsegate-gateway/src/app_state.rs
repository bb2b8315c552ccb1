//! Shared application state.
//!
//! The metric registry, instrumentation feature, and route table are
//! constructed once at startup and shared by reference thereafter. Startup
//! errors are explicit (Result instead of panic): a marked handler with an
//! unresolvable identity must fail here, before any request is served.

use std::sync::Arc;

use pulsegate_core::instrument::InstrumentationFeature;
use pulsegate_core::registry::MetricRegistry;
use pulsegate_core::Result;

use crate::config::GatewayConfig;
use crate::host::RouteTable;
use crate::services;

#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    cfg: GatewayConfig,
    registry: Arc<MetricRegistry>,
    routes: RouteTable,
}

impl AppState {
    /// Build application state and register the built-in services.
    pub fn new(cfg: GatewayConfig) -> Result<Self> {
        let registry = Arc::new(MetricRegistry::new());
        let feature = InstrumentationFeature::new(Arc::clone(&registry));
        let routes = RouteTable::new(feature);

        services::register_builtin(&routes)?;

        tracing::info!(
            routes = ?routes.registered_routes(),
            timers = registry.timer_count(),
            meters = registry.meter_count(),
            "instrumented routes registered"
        );

        Ok(Self {
            inner: Arc::new(AppStateInner {
                cfg,
                registry,
                routes,
            }),
        })
    }

    pub fn cfg(&self) -> &GatewayConfig {
        &self.inner.cfg
    }

    pub fn registry(&self) -> Arc<MetricRegistry> {
        Arc::clone(&self.inner.registry)
    }

    pub fn routes(&self) -> &RouteTable {
        &self.inner.routes
    }
}
