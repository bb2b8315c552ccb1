//! Host-framework adapter: request-scoped storage and the instrumented
//! route table the axum surface dispatches into.

pub mod dispatch;
pub mod scope;

pub use dispatch::{Handler, RequestCtx, RouteTable};
pub use scope::PropertyBag;
