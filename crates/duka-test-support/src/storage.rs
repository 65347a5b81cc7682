//! Object store held in memory.

use async_trait::async_trait;
use duka_invoice::{InvoiceError, ObjectStore};
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

pub const MEMORY_BASE_URL: &str = "https://files.test";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<BTreeMap<String, StoredObject>>,
    fail: bool,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuses every upload.
    pub fn failing() -> Self {
        Self {
            objects: Mutex::default(),
            fail: true,
        }
    }

    pub fn get(&self, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, key: &str, bytes: Vec<u8>, content_type: &str) -> Result<String, InvoiceError> {
        if self.fail {
            return Err(InvoiceError::Upload {
                key: key.to_string(),
                reason: "storage unavailable".to_string(),
            });
        }
        self.objects.lock().unwrap_or_else(PoisonError::into_inner).insert(
            key.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(format!("{MEMORY_BASE_URL}/{key}"))
    }
}
