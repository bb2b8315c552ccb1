//! Metric-identity resolution.
//!
//! A metric identifier is `"<VERB> - <path>"`, optionally suffixed with
//! `.<explicit-name>`; a name declared absolute stands alone. Resolution is
//! pure and deterministic: the same (marker, handler) pair always yields the
//! same identifier.

use crate::error::{PulsegateError, Result};
use crate::marker::{HandlerDescriptor, HttpVerb};

/// Resolve one marker's metric identifier.
pub fn resolve(explicit_name: &str, absolute: bool, desc: &HandlerDescriptor) -> Result<String> {
    if !explicit_name.is_empty() {
        if absolute {
            return Ok(explicit_name.to_string());
        }
        return Ok(format!("{}.{}", base_name(desc)?, explicit_name));
    }
    base_name(desc)
}

/// Canonical handler identity: verb, literal `" - "`, joined path.
pub fn base_name(desc: &HandlerDescriptor) -> Result<String> {
    Ok(format!(
        "{} - {}",
        resolve_verb(desc)?.as_str(),
        handler_path(desc)
    ))
}

/// Join of the resource-level and method-level path segments, skipping
/// whichever is absent.
pub fn handler_path(desc: &HandlerDescriptor) -> String {
    match (&desc.resource_path, &desc.method_path) {
        (Some(resource), Some(method)) => format!("{resource}/{method}"),
        (Some(resource), None) => resource.clone(),
        (None, Some(method)) => method.clone(),
        (None, None) => String::new(),
    }
}

/// First verb marker present, in fixed priority order. A marked handler
/// without any verb has no usable identity and must fail before serving.
pub fn resolve_verb(desc: &HandlerDescriptor) -> Result<HttpVerb> {
    for verb in HttpVerb::PRIORITY {
        if desc.verbs.contains(&verb) {
            return Ok(verb);
        }
    }
    Err(PulsegateError::Configuration(format!(
        "handler {} has no GET, POST, PUT, DELETE, HEAD or OPTIONS marker",
        desc.resource
    )))
}
