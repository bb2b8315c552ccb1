//! Built-in services and their instrumentation markers.

pub mod echo;
pub mod store;

pub use echo::EchoService;
pub use store::{ItemMissing, StoreService};

use std::sync::Arc;

use pulsegate_core::marker::{CauseMatcher, HandlerDescriptor, HttpVerb, Marker};
use pulsegate_core::Result;

use crate::host::RouteTable;

/// Register the built-in services with their markers.
pub fn register_builtin(routes: &RouteTable) -> Result<()> {
    routes.register(
        &HandlerDescriptor::new("EchoService")
            .resource_path("/echo")
            .method_path("message")
            .verb(HttpVerb::Post)
            .marker(Marker::Metered {
                name: "echo-meter".into(),
                absolute: false,
            })
            .marker(Marker::Timed {
                name: "echo-timer".into(),
                absolute: false,
            }),
        Arc::new(EchoService::new()),
    )?;

    routes.register(
        &HandlerDescriptor::new("StoreService")
            .resource_path("/store")
            .method_path("item")
            .verb(HttpVerb::Get)
            .marker(Marker::Metered {
                name: "store-meter".into(),
                absolute: false,
            })
            .marker(Marker::Timed {
                name: "store-timer".into(),
                absolute: false,
            })
            .marker(Marker::ExceptionMetered {
                name: "store-exception-meter".into(),
                absolute: false,
                cause: CauseMatcher::of::<ItemMissing>(),
            }),
        Arc::new(StoreService::new()),
    )?;

    Ok(())
}
