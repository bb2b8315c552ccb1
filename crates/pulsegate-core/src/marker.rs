//! Static instrumentation metadata attached to handlers.
//!
//! A [`HandlerDescriptor`] is produced by the host once per handler at
//! route-registration time and is read-only thereafter. All marker inspection
//! happens in [`crate::instrument::InstrumentationFeature::configure`]; no
//! metadata is consulted at request time.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// HTTP verbs recognized for metric identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Delete,
    Head,
    Options,
}

impl HttpVerb {
    /// Scan order when a handler declares more than one verb marker.
    pub const PRIORITY: [HttpVerb; 6] = [
        HttpVerb::Get,
        HttpVerb::Post,
        HttpVerb::Put,
        HttpVerb::Delete,
        HttpVerb::Head,
        HttpVerb::Options,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Delete => "DELETE",
            HttpVerb::Head => "HEAD",
            HttpVerb::Options => "OPTIONS",
        }
    }
}

/// Matches a failure's root cause against a configured trigger.
///
/// [`CauseMatcher::of`] matches one concrete error type via downcast;
/// [`CauseMatcher::matching`] takes an arbitrary predicate for family-style
/// matching (e.g. any variant of an error enum).
#[derive(Clone)]
pub struct CauseMatcher {
    trigger: &'static str,
    predicate: Arc<dyn Fn(&(dyn Error + 'static)) -> bool + Send + Sync>,
}

impl CauseMatcher {
    /// Match when the root cause is exactly `E`.
    pub fn of<E: Error + 'static>() -> Self {
        Self {
            trigger: std::any::type_name::<E>(),
            predicate: Arc::new(|cause| cause.is::<E>()),
        }
    }

    /// Match with a caller-supplied predicate. `trigger` is a label used in
    /// diagnostics only.
    pub fn matching(
        trigger: &'static str,
        predicate: impl Fn(&(dyn Error + 'static)) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self {
            trigger,
            predicate: Arc::new(predicate),
        }
    }

    pub fn matches(&self, cause: &(dyn Error + 'static)) -> bool {
        (self.predicate)(cause)
    }

    pub fn trigger(&self) -> &'static str {
        self.trigger
    }
}

impl fmt::Debug for CauseMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CauseMatcher")
            .field("trigger", &self.trigger)
            .finish()
    }
}

/// One instrumentation marker declared on a handler.
#[derive(Debug, Clone)]
pub enum Marker {
    /// Time every invocation of the handler.
    Timed { name: String, absolute: bool },
    /// Count every invocation attempt, success or failure.
    Metered { name: String, absolute: bool },
    /// Count invocations whose failure root cause matches `cause`.
    ExceptionMetered {
        name: String,
        absolute: bool,
        cause: CauseMatcher,
    },
}

/// Static description of one routed handler.
#[derive(Debug, Clone)]
pub struct HandlerDescriptor {
    /// Declaring resource name, used in diagnostics.
    pub resource: String,
    /// Resource-level path segment, if any.
    pub resource_path: Option<String>,
    /// Method-level path segment, if any.
    pub method_path: Option<String>,
    /// Verb markers present on the handler.
    pub verbs: Vec<HttpVerb>,
    /// Instrumentation markers present on the handler.
    pub markers: Vec<Marker>,
}

impl HandlerDescriptor {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            resource_path: None,
            method_path: None,
            verbs: Vec::new(),
            markers: Vec::new(),
        }
    }

    pub fn resource_path(mut self, path: impl Into<String>) -> Self {
        self.resource_path = Some(path.into());
        self
    }

    pub fn method_path(mut self, path: impl Into<String>) -> Self {
        self.method_path = Some(path.into());
        self
    }

    pub fn verb(mut self, verb: HttpVerb) -> Self {
        self.verbs.push(verb);
        self
    }

    pub fn marker(mut self, marker: Marker) -> Self {
        self.markers.push(marker);
        self
    }
}
