//! In-process key-value store.

use super::{KeyValueStore, KvResult};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Non-durable store for hosts without on-device storage and for tests.
///
/// Clones share one map, so a caller can keep a handle and inspect values
/// written through another clone.
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryKvStore {
    fn get(&self, key: &str) -> KvResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> KvResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
