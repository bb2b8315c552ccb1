use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;

use pulsegate_core::error::BoxError;

use crate::host::{Handler, RequestCtx};

/// Root cause for a failed lookup. The store's exception-metered marker
/// triggers on this type.
#[derive(Debug, Error)]
#[error("no item with id {0}")]
pub struct ItemMissing(pub String);

#[derive(Debug, Error)]
pub enum StoreError {
    /// Lookup failure wrapping the root cause.
    #[error("item lookup failed")]
    Lookup {
        #[source]
        source: ItemMissing,
    },
    #[error("missing id parameter")]
    MissingId,
}

/// Fixed in-memory item store.
pub struct StoreService {
    items: HashMap<&'static str, &'static str>,
}

impl StoreService {
    pub fn new() -> Self {
        let mut items = HashMap::new();
        items.insert("42", "towel");
        items.insert("7", "lantern");
        Self { items }
    }
}

impl Default for StoreService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Handler for StoreService {
    async fn handle(&self, ctx: RequestCtx) -> Result<serde_json::Value, BoxError> {
        let id = ctx
            .query_param("id")
            .ok_or_else(|| Box::new(StoreError::MissingId) as BoxError)?;

        match self.items.get(id) {
            Some(item) => Ok(json!({ "id": id, "item": item })),
            None => Err(Box::new(StoreError::Lookup {
                source: ItemMissing(id.to_string()),
            })),
        }
    }
}
