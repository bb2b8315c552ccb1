//! Instrumented route table.
//!
//! Registration configures each handler's interceptors once from its static
//! markers; configuration errors surface here, at startup. Dispatch runs the
//! entry hooks, wraps the invocation, then runs the exit hooks on every
//! outcome. An unknown route fails before any hook fires.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::value::RawValue;

use pulsegate_core::error::{BoxError, PulsegateError};
use pulsegate_core::instrument::{HandlerInstrumentation, InstrumentationFeature};
use pulsegate_core::marker::{HandlerDescriptor, HttpVerb};
use pulsegate_core::{naming, Result};

use crate::host::scope::PropertyBag;

/// Per-request context handed to handlers.
#[derive(Debug)]
pub struct RequestCtx {
    pub verb: HttpVerb,
    pub path: String,
    pub query: HashMap<String, String>,
    /// Optional payload, stored as raw JSON (lazy parsing).
    pub body: Option<Box<RawValue>>,
}

impl RequestCtx {
    pub fn new(verb: HttpVerb, path: impl Into<String>) -> Self {
        Self {
            verb,
            path: path.into(),
            query: HashMap::new(),
            body: None,
        }
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query.get(key).map(String::as_str)
    }
}

/// One unit of request-handling logic reachable at a verb + path.
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: RequestCtx) -> std::result::Result<serde_json::Value, BoxError>;
}

#[derive(Clone)]
struct RouteEntry {
    handler: Arc<dyn Handler>,
    instr: Arc<HandlerInstrumentation>,
}

/// Routes keyed by `"<VERB> <path>"`.
pub struct RouteTable {
    feature: InstrumentationFeature,
    routes: DashMap<String, RouteEntry>,
}

impl RouteTable {
    pub fn new(feature: InstrumentationFeature) -> Self {
        Self {
            feature,
            routes: DashMap::new(),
        }
    }

    /// Register a handler under the descriptor's verb + joined path.
    /// Re-registering the same descriptor replaces the route and reuses the
    /// originally configured interceptors.
    pub fn register(&self, desc: &HandlerDescriptor, handler: Arc<dyn Handler>) -> Result<()> {
        let instr = self.feature.configure(desc)?;
        let verb = naming::resolve_verb(desc)?;
        let key = route_key(verb, &naming::handler_path(desc));
        self.routes.insert(key, RouteEntry { handler, instr });
        Ok(())
    }

    pub fn registered_routes(&self) -> Vec<String> {
        self.routes.iter().map(|e| e.key().clone()).collect()
    }

    /// Serve one request end to end.
    pub async fn dispatch(
        &self,
        verb: HttpVerb,
        path: &str,
        ctx: RequestCtx,
    ) -> std::result::Result<serde_json::Value, BoxError> {
        let key = route_key(verb, path);
        let entry = self
            .routes
            .get(&key)
            .ok_or_else(|| Box::new(PulsegateError::UnknownRoute(key.clone())) as BoxError)?
            .value()
            .clone();

        let mut bag = PropertyBag::new();
        entry.instr.on_entry(&mut bag);
        let out = entry.instr.invoke(entry.handler.handle(ctx)).await;
        entry.instr.on_exit(&mut bag);
        out
    }
}

fn route_key(verb: HttpVerb, path: &str) -> String {
    format!("{} {}", verb.as_str(), path)
}
