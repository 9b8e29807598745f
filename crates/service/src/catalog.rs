//! Read-only services catalog, stored as an opaque tree under `services`.

use std::sync::Arc;

use serde_json::Value;

use crate::errors::StoreError;
use crate::store::RecordStore;

pub const SERVICES: &str = "services";

#[derive(Clone)]
pub struct ServiceCatalog {
    store: Arc<dyn RecordStore>,
}

impl ServiceCatalog {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// The stored tree verbatim, or an empty array when nothing is stored.
    pub async fn list(&self) -> Result<Value, StoreError> {
        Ok(self.store.read(SERVICES).await?.unwrap_or_else(|| Value::Array(Vec::new())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{mock::FailingStore, JsonTreeStore};
    use serde_json::json;

    #[tokio::test]
    async fn absent_services_read_as_empty_array() -> Result<(), StoreError> {
        let catalog = ServiceCatalog::new(JsonTreeStore::in_memory());
        assert_eq!(catalog.list().await?, json!([]));
        Ok(())
    }

    #[tokio::test]
    async fn stored_tree_is_returned_verbatim() -> Result<(), StoreError> {
        let tree = json!({"s1": {"name": "Repair", "enabled": true}, "s2": {"name": "Delivery"}});
        let catalog = ServiceCatalog::new(JsonTreeStore::with_data(json!({ "services": tree.clone() })));
        assert_eq!(catalog.list().await?, tree);
        Ok(())
    }

    #[tokio::test]
    async fn store_failure_is_returned() {
        let catalog = ServiceCatalog::new(Arc::new(FailingStore::default()));
        assert!(matches!(catalog.list().await, Err(StoreError::Io(_))));
    }
}
