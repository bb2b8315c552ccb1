#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;

use pulsegate_core::error::{BoxError, PulsegateError};
use pulsegate_core::instrument::InstrumentationFeature;
use pulsegate_core::marker::{CauseMatcher, HandlerDescriptor, HttpVerb, Marker};
use pulsegate_core::registry::MetricRegistry;
use pulsegate_gateway::app_state::AppState;
use pulsegate_gateway::config;
use pulsegate_gateway::host::{Handler, RequestCtx, RouteTable};

// --------------------
// Fixtures
// --------------------

#[derive(Debug, Error)]
#[error("my exception")]
struct MyException;

#[derive(Debug, Error)]
#[error("handler failed")]
struct HandlerFailed {
    #[source]
    source: MyException,
}

struct MyResource;

#[async_trait]
impl Handler for MyResource {
    async fn handle(&self, ctx: RequestCtx) -> Result<serde_json::Value, BoxError> {
        if ctx.query_param("command") == Some("throw") {
            return Err(Box::new(HandlerFailed {
                source: MyException,
            }));
        }
        Ok(json!("hello world!"))
    }
}

fn my_resource() -> HandlerDescriptor {
    HandlerDescriptor::new("MyResource")
        .resource_path("/myresource")
        .method_path("test")
        .verb(HttpVerb::Get)
        .marker(Marker::Metered {
            name: "resource-meter".into(),
            absolute: false,
        })
        .marker(Marker::Timed {
            name: "resource-timer".into(),
            absolute: false,
        })
        .marker(Marker::ExceptionMetered {
            name: "resource-exception-meter".into(),
            absolute: false,
            cause: CauseMatcher::of::<MyException>(),
        })
}

fn build_table() -> (Arc<MetricRegistry>, RouteTable) {
    let registry = Arc::new(MetricRegistry::new());
    let table = RouteTable::new(InstrumentationFeature::new(Arc::clone(&registry)));
    table
        .register(&my_resource(), Arc::new(MyResource))
        .unwrap();
    (registry, table)
}

fn get(path: &str) -> RequestCtx {
    RequestCtx::new(HttpVerb::Get, path)
}

// --------------------
// End-to-end scenarios
// --------------------

#[tokio::test]
async fn normal_call_records_meter_and_timer() {
    let (registry, table) = build_table();

    let out = table
        .dispatch(HttpVerb::Get, "/myresource/test", get("/myresource/test"))
        .await
        .unwrap();
    assert_eq!(out, json!("hello world!"));

    let meter = registry
        .find_meter("GET - /myresource/test.resource-meter")
        .unwrap();
    assert_eq!(meter.count(), 1);

    let timer = registry
        .find_timer("GET - /myresource/test.resource-timer")
        .unwrap();
    assert_eq!(timer.count(), 1);

    let exceptions = registry
        .find_meter("GET - /myresource/test.resource-exception-meter")
        .unwrap();
    assert_eq!(exceptions.count(), 0);
}

#[tokio::test]
async fn throwing_call_marks_exception_meter_and_rethrows() {
    let (registry, table) = build_table();

    table
        .dispatch(HttpVerb::Get, "/myresource/test", get("/myresource/test"))
        .await
        .unwrap();

    let mut ctx = get("/myresource/test");
    ctx.query.insert("command".into(), "throw".into());
    let err = table
        .dispatch(HttpVerb::Get, "/myresource/test", ctx)
        .await
        .expect_err("must rethrow");

    // the caller observes the original failure unchanged
    assert!(err.downcast_ref::<HandlerFailed>().is_some());
    assert_eq!(err.to_string(), "handler failed");

    let exceptions = registry
        .find_meter("GET - /myresource/test.resource-exception-meter")
        .unwrap();
    assert_eq!(exceptions.count(), 1);

    // the rate meter counts the failed attempt too, and the timer still pairs
    let meter = registry
        .find_meter("GET - /myresource/test.resource-meter")
        .unwrap();
    assert_eq!(meter.count(), 2);
    let timer = registry
        .find_timer("GET - /myresource/test.resource-timer")
        .unwrap();
    assert_eq!(timer.count(), 2);
}

#[tokio::test]
async fn unknown_route_fails_before_any_hook() {
    let (registry, table) = build_table();

    let err = table
        .dispatch(HttpVerb::Get, "/nope", get("/nope"))
        .await
        .expect_err("must fail");
    let known = err.downcast_ref::<PulsegateError>().unwrap();
    assert!(matches!(known, PulsegateError::UnknownRoute(_)));

    let meter = registry
        .find_meter("GET - /myresource/test.resource-meter")
        .unwrap();
    assert_eq!(meter.count(), 0);
    let timer = registry
        .find_timer("GET - /myresource/test.resource-timer")
        .unwrap();
    assert_eq!(timer.count(), 0);
}

#[tokio::test]
async fn concurrent_requests_lose_no_updates() {
    let (registry, table) = build_table();
    let table = Arc::new(table);

    let mut handles = Vec::new();
    for _ in 0..32 {
        let table = Arc::clone(&table);
        handles.push(tokio::spawn(async move {
            table
                .dispatch(HttpVerb::Get, "/myresource/test", get("/myresource/test"))
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let meter = registry
        .find_meter("GET - /myresource/test.resource-meter")
        .unwrap();
    assert_eq!(meter.count(), 32);
    let timer = registry
        .find_timer("GET - /myresource/test.resource-timer")
        .unwrap();
    assert_eq!(timer.count(), 32);
}

#[tokio::test]
async fn render_exposes_registered_identifiers() {
    let (registry, table) = build_table();
    table
        .dispatch(HttpVerb::Get, "/myresource/test", get("/myresource/test"))
        .await
        .unwrap();

    let text = registry.render();
    assert!(text.contains(
        "pulsegate_invocations_total{metric=\"GET - /myresource/test.resource-meter\"} 1"
    ));
    assert!(text
        .contains("pulsegate_request_duration_micros_count{metric=\"GET - /myresource/test.resource-timer\"} 1"));
}

// --------------------
// Built-in services through AppState
// --------------------

#[tokio::test]
async fn builtin_store_exception_flow() {
    let cfg = config::load_from_str("version: 1").unwrap();
    let state = AppState::new(cfg).unwrap();
    let registry = state.registry();

    // hit: no exception
    let mut ctx = get("/store/item");
    ctx.query.insert("id".into(), "42".into());
    let out = state
        .routes()
        .dispatch(HttpVerb::Get, "/store/item", ctx)
        .await
        .unwrap();
    assert_eq!(out["item"], "towel");

    // miss: root cause is ItemMissing, so the exception meter fires
    let mut ctx = get("/store/item");
    ctx.query.insert("id".into(), "99".into());
    let err = state
        .routes()
        .dispatch(HttpVerb::Get, "/store/item", ctx)
        .await
        .expect_err("must fail");
    assert_eq!(err.to_string(), "item lookup failed");

    let exceptions = registry
        .find_meter("GET - /store/item.store-exception-meter")
        .unwrap();
    assert_eq!(exceptions.count(), 1);

    // a different failure shape leaves the exception meter untouched
    let err = state
        .routes()
        .dispatch(HttpVerb::Get, "/store/item", get("/store/item"))
        .await
        .expect_err("must fail");
    assert_eq!(err.to_string(), "missing id parameter");
    assert_eq!(exceptions.count(), 1);

    let meter = registry.find_meter("GET - /store/item.store-meter").unwrap();
    assert_eq!(meter.count(), 3);
}
