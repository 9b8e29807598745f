//! Record store abstractions.
//!
//! A record store is a hierarchical key-value tree: every node is addressed by a
//! slash-separated path and collections are simply the children of a node.
//! Handlers only ever talk to [`RecordStore`]; the concrete backend is chosen at startup.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::StoreError;

pub mod json_tree_store;
pub mod push_id;

pub use json_tree_store::JsonTreeStore;
pub use push_id::PushIdGenerator;

/// Children of a collection, ordered by key.
pub type Entries = BTreeMap<String, Value>;

/// Gateway to the hierarchical store.
///
/// Every call is a single attempt; failures are returned whole and never retried.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Raw read of the node at `path`. `None` when nothing is stored there.
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Write `value` under a freshly generated, sortable key and return that key.
    async fn create_with_generated_key(&self, collection: &str, value: Value) -> Result<String, StoreError>;

    /// Shallow overwrite of the supplied fields of `collection/key`.
    /// A `null` field removes it. The key is created when absent.
    async fn merge_update(&self, collection: &str, key: &str, partial: Map<String, Value>) -> Result<(), StoreError>;

    /// Remove `collection/key`. Removing an absent key succeeds.
    async fn remove(&self, collection: &str, key: &str) -> Result<(), StoreError>;

    /// All children of `collection`; empty when the collection is absent.
    async fn list_all(&self, collection: &str) -> Result<Entries, StoreError> {
        match self.read(collection).await? {
            Some(Value::Object(children)) => Ok(children.into_iter().collect()),
            _ => Ok(Entries::new()),
        }
    }

    async fn get_by_key(&self, collection: &str, key: &str) -> Result<Option<Value>, StoreError> {
        self.read(&child_path(collection, key)?).await
    }

    /// Children of `collection` whose direct `field` equals `value`.
    async fn find_by_field(&self, collection: &str, field: &str, value: &Value) -> Result<Entries, StoreError> {
        let all = self.list_all(collection).await?;
        Ok(all
            .into_iter()
            .filter(|(_, child)| child.get(field) == Some(value))
            .collect())
    }
}

const FORBIDDEN: [char; 5] = ['.', '#', '$', '[', ']'];

/// A record key names exactly one child: non-blank, no `/`, none of `. # $ [ ]`.
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty() && !key.contains('/') && !key.contains(FORBIDDEN)
}

/// Path of the record `key` inside `collection`.
pub fn child_path(collection: &str, key: &str) -> Result<String, StoreError> {
    if !is_valid_key(key) {
        return Err(StoreError::InvalidPath(format!("'{key}' is not a record key")));
    }
    Ok(format!("{}/{}", collection.trim_end_matches('/'), key))
}

/// Split a path into its segments, ignoring empty ones.
pub fn segments(path: &str) -> Result<Vec<&str>, StoreError> {
    let segs: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if let Some(bad) = segs.iter().find(|s| s.contains(FORBIDDEN)) {
        return Err(StoreError::InvalidPath(format!("segment '{bad}' in '{path}' contains one of . # $ [ ]")));
    }
    Ok(segs)
}

/// Store doubles for tests.
pub mod mock {
    use super::*;

    /// Fails every call, as an unreachable backend would.
    pub struct FailingStore {
        pub message: String,
    }

    impl Default for FailingStore {
        fn default() -> Self {
            Self { message: "connection refused".to_string() }
        }
    }

    impl FailingStore {
        fn fail<T>(&self) -> Result<T, StoreError> {
            Err(StoreError::Io(self.message.clone()))
        }
    }

    #[async_trait]
    impl RecordStore for FailingStore {
        async fn read(&self, _path: &str) -> Result<Option<Value>, StoreError> {
            self.fail()
        }

        async fn create_with_generated_key(&self, _collection: &str, _value: Value) -> Result<String, StoreError> {
            self.fail()
        }

        async fn merge_update(&self, _collection: &str, _key: &str, _partial: Map<String, Value>) -> Result<(), StoreError> {
            self.fail()
        }

        async fn remove(&self, _collection: &str, _key: &str) -> Result<(), StoreError> {
            self.fail()
        }
    }
}
