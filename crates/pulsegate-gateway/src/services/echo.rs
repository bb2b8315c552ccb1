use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use pulsegate_core::error::{BoxError, PulsegateError};

use crate::host::{Handler, RequestCtx};

#[derive(Default)]
pub struct EchoService;

impl EchoService {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Deserialize)]
struct EchoReq {
    msg: String,
}

#[async_trait]
impl Handler for EchoService {
    async fn handle(&self, ctx: RequestCtx) -> Result<serde_json::Value, BoxError> {
        let raw = ctx
            .body
            .as_ref()
            .ok_or_else(|| PulsegateError::BadRequest("echo requires a body".into()))
            .map_err(|e| Box::new(e) as BoxError)?;

        let req: EchoReq = serde_json::from_str(raw.get())
            .map_err(|e| Box::new(PulsegateError::BadRequest(format!("echo invalid data: {e}"))) as BoxError)?;

        Ok(json!({
            "echo": req.msg,
            "len": req.msg.len(),
        }))
    }
}
