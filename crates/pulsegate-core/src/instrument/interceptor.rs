//! Per-request interceptors.
//!
//! Entry/exit hooks are strictly best-effort: a failure inside
//! instrumentation is logged and dropped, never surfaced to the request
//! pipeline. The exception-metered wrapper is the one interceptor that sits
//! around the handler invocation itself, because it must observe the
//! failure's root cause; it always returns the original failure unchanged.

use std::any::Any;
use std::error::Error;
use std::future::Future;
use std::sync::Arc;

use crate::error::BoxError;
use crate::marker::CauseMatcher;
use crate::registry::{Meter, Timer, TimerContext};
use crate::Result;

/// Key under which the in-flight measurement rides on the request scope.
pub const IN_FLIGHT_KEY: &str = "pulsegate.in-flight";

/// Opaque value stashed on a request scope.
pub type ScopedValue = Box<dyn Any + Send>;

/// One request's private key/value storage, valid only between its entry and
/// exit hooks. Never shared across requests.
pub trait RequestScope {
    /// Stash a value under `key`, replacing any previous occupant.
    fn put(&mut self, key: &'static str, value: ScopedValue) -> Result<()>;
    /// Remove and return the value under `key`, if any.
    fn take(&mut self, key: &'static str) -> Result<Option<ScopedValue>>;
}

/// Entry/exit hook pair pairing one duration measurement per request.
pub struct TimedInterceptor {
    timer: Arc<Timer>,
}

impl TimedInterceptor {
    pub fn new(timer: Arc<Timer>) -> Self {
        Self { timer }
    }

    /// Start measuring and stash the token. On any failure the request
    /// proceeds untimed.
    pub fn on_entry(&self, scope: &mut dyn RequestScope) {
        let token = self.timer.clone().start();
        if let Err(e) = scope.put(IN_FLIGHT_KEY, Box::new(token)) {
            tracing::warn!(error = %e, "failed to stash in-flight measurement");
        }
    }

    /// Finalize the measurement if one was started. Runs on every exit path,
    /// including requests for which entry never stored a token.
    pub fn on_exit(&self, scope: &mut dyn RequestScope) {
        match scope.take(IN_FLIGHT_KEY) {
            Ok(Some(value)) => match value.downcast::<TimerContext>() {
                Ok(token) => {
                    token.stop();
                }
                Err(_) => {
                    tracing::warn!("in-flight slot held a foreign value; measurement dropped");
                }
            },
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "failed to retrieve in-flight measurement");
            }
        }
    }
}

/// Entry hook counting every invocation attempt, success or failure.
pub struct MeteredInterceptor {
    meter: Arc<Meter>,
}

impl MeteredInterceptor {
    pub fn new(meter: Arc<Meter>) -> Self {
        Self { meter }
    }

    pub fn on_entry(&self) {
        self.meter.mark();
    }
}

/// Wraps the handler invocation to observe failure root causes.
pub struct ExceptionMeteredInterceptor {
    meter: Arc<Meter>,
    cause: CauseMatcher,
}

impl ExceptionMeteredInterceptor {
    pub fn new(meter: Arc<Meter>, cause: CauseMatcher) -> Self {
        Self { meter, cause }
    }

    /// Wrap one synchronous invocation.
    pub fn invoke<T>(
        &self,
        call: impl FnOnce() -> std::result::Result<T, BoxError>,
    ) -> std::result::Result<T, BoxError> {
        let out = call();
        if let Err(err) = &out {
            self.observe(err.as_ref());
        }
        out
    }

    /// Wrap one asynchronous invocation.
    pub async fn invoke_async<T, F>(&self, fut: F) -> std::result::Result<T, BoxError>
    where
        F: Future<Output = std::result::Result<T, BoxError>>,
    {
        let out = fut.await;
        if let Err(err) = &out {
            self.observe(err.as_ref());
        }
        out
    }

    fn observe(&self, err: &(dyn Error + 'static)) {
        if self.cause.matches(root_cause(err)) {
            self.meter.mark();
        }
    }
}

/// Innermost error in a source chain.
pub fn root_cause<'a>(err: &'a (dyn Error + 'static)) -> &'a (dyn Error + 'static) {
    let mut current = err;
    while let Some(source) = current.source() {
        current = source;
    }
    current
}
