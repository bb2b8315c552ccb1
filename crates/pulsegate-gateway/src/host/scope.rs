//! Request-scoped property storage.

use std::collections::HashMap;

use pulsegate_core::instrument::{RequestScope, ScopedValue};
use pulsegate_core::Result;

/// String-keyed bag owned by exactly one request, valid between its entry
/// and exit hooks.
#[derive(Default)]
pub struct PropertyBag {
    slots: HashMap<&'static str, ScopedValue>,
}

impl PropertyBag {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RequestScope for PropertyBag {
    fn put(&mut self, key: &'static str, value: ScopedValue) -> Result<()> {
        self.slots.insert(key, value);
        Ok(())
    }

    fn take(&mut self, key: &'static str) -> Result<Option<ScopedValue>> {
        Ok(self.slots.remove(key))
    }
}
