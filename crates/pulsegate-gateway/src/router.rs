//! Axum router wiring (HTTP -> instrumented dispatch).
//!
//! A single fallback route adapts any inbound request onto the instrumented
//! route table; the configured metrics path renders the registry.

use std::collections::HashMap;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, value::RawValue};

use pulsegate_core::error::{BoxError, ClientCode, PulsegateError};
use pulsegate_core::marker::HttpVerb;

use crate::app_state::AppState;
use crate::host::RequestCtx;

pub fn build_router(state: AppState) -> Router {
    let metrics_path = state.cfg().metrics.path.clone();
    Router::new()
        .route(&metrics_path, get(render_metrics))
        .fallback(dispatch_any)
        .with_state(state)
}

async fn render_metrics(State(app): State<AppState>) -> String {
    app.registry().render()
}

async fn dispatch_any(State(app): State<AppState>, req: Request) -> Response {
    let (parts, body) = req.into_parts();

    let Some(verb) = verb_from_method(&parts.method) else {
        return error_json(StatusCode::METHOD_NOT_ALLOWED, ClientCode::BadRequest, "unsupported method");
    };

    let path = parts.uri.path().to_string();
    let query = parse_query(parts.uri.query());

    let raw_body = match read_body(body, app.cfg().gateway.max_body_bytes).await {
        Ok(raw) => raw,
        Err(msg) => return error_json(StatusCode::BAD_REQUEST, ClientCode::BadRequest, &msg),
    };

    let mut ctx = RequestCtx::new(verb, path.clone());
    ctx.query = query;
    ctx.body = raw_body;

    match app.routes().dispatch(verb, &path, ctx).await {
        Ok(value) => Json(value).into_response(),
        Err(err) => failure_response(err),
    }
}

fn verb_from_method(method: &Method) -> Option<HttpVerb> {
    if method == Method::GET {
        Some(HttpVerb::Get)
    } else if method == Method::POST {
        Some(HttpVerb::Post)
    } else if method == Method::PUT {
        Some(HttpVerb::Put)
    } else if method == Method::DELETE {
        Some(HttpVerb::Delete)
    } else if method == Method::HEAD {
        Some(HttpVerb::Head)
    } else if method == Method::OPTIONS {
        Some(HttpVerb::Options)
    } else {
        None
    }
}

/// Minimal query-string split. Values are used verbatim (no percent-decoding).
fn parse_query(query: Option<&str>) -> HashMap<String, String> {
    let mut out = HashMap::new();
    let Some(query) = query else {
        return out;
    };
    for pair in query.split('&') {
        if pair.is_empty() {
            continue;
        }
        match pair.split_once('=') {
            Some((k, v)) => out.insert(k.to_string(), v.to_string()),
            None => out.insert(pair.to_string(), String::new()),
        };
    }
    out
}

async fn read_body(body: Body, limit: usize) -> std::result::Result<Option<Box<RawValue>>, String> {
    let bytes = to_bytes(body, limit)
        .await
        .map_err(|e| format!("read body failed: {e}"))?;
    if bytes.is_empty() {
        return Ok(None);
    }
    let text = String::from_utf8(bytes.to_vec()).map_err(|_| "body is not utf-8".to_string())?;
    let raw = RawValue::from_string(text).map_err(|e| format!("body is not json: {e}"))?;
    Ok(Some(raw))
}

/// Map a dispatch failure to a client-visible response. Handler failures
/// arrive here untouched by instrumentation.
fn failure_response(err: BoxError) -> Response {
    match err.downcast_ref::<PulsegateError>() {
        Some(known) => {
            let code = known.client_code();
            let status = match code {
                ClientCode::BadRequest => StatusCode::BAD_REQUEST,
                ClientCode::NotFound => StatusCode::NOT_FOUND,
                ClientCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            };
            error_json(status, code, &known.to_string())
        }
        None => error_json(
            StatusCode::INTERNAL_SERVER_ERROR,
            ClientCode::Internal,
            &err.to_string(),
        ),
    }
}

fn error_json(status: StatusCode, code: ClientCode, msg: &str) -> Response {
    (
        status,
        Json(json!({
            "code": code.as_str(),
            "msg": msg,
        })),
    )
        .into_response()
}
