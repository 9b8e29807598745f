use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::{fs, sync::RwLock};
use tracing::debug;

use super::{child_path, segments, PushIdGenerator, RecordStore};
use crate::errors::StoreError;

/// Hierarchical JSON document store.
///
/// The whole database is one JSON object tree. When backed by a file, the tree
/// is loaded once and rewritten after every mutation; otherwise it lives in memory only.
#[derive(Clone)]
pub struct JsonTreeStore {
    inner: Arc<RwLock<Value>>,
    file_path: Option<PathBuf>,
    ids: Arc<PushIdGenerator>,
}

impl JsonTreeStore {
    /// Initialize the store from a path. Creates the file with an empty tree if missing.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, StoreError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).await.map_err(StoreError::io)?;
        }

        let root = match fs::read(&file_path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => empty_tree(),
            Ok(bytes) => {
                let root: Value = serde_json::from_slice(&bytes).map_err(StoreError::serialization)?;
                if !root.is_object() {
                    return Err(StoreError::Serialization(format!(
                        "{} does not hold a JSON object",
                        file_path.display()
                    )));
                }
                root
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty = empty_tree();
                fs::write(&file_path, serde_json::to_vec(&empty).map_err(StoreError::serialization)?)
                    .await
                    .map_err(StoreError::io)?;
                empty
            }
            Err(e) => return Err(StoreError::io(e)),
        };

        debug!(path = %file_path.display(), "json tree store opened");
        Ok(Arc::new(Self::build(root, Some(file_path))))
    }

    /// Store with no backing file.
    pub fn in_memory() -> Arc<Self> {
        Arc::new(Self::build(empty_tree(), None))
    }

    /// In-memory store seeded with `root`; a non-object seed starts empty.
    pub fn with_data(root: Value) -> Arc<Self> {
        let root = if root.is_object() { root } else { empty_tree() };
        Arc::new(Self::build(root, None))
    }

    fn build(root: Value, file_path: Option<PathBuf>) -> Self {
        Self { inner: Arc::new(RwLock::new(root)), file_path, ids: Arc::new(PushIdGenerator::new()) }
    }

    /// Copy of the whole tree.
    pub async fn snapshot(&self) -> Value {
        self.inner.read().await.clone()
    }

    async fn save(&self, root: &Value) -> Result<(), StoreError> {
        let Some(path) = &self.file_path else { return Ok(()) };
        let data = serde_json::to_vec(root).map_err(StoreError::serialization)?;
        fs::write(path, data).await.map_err(StoreError::io)?;
        Ok(())
    }

    /// Apply `mutate` to a copy of the tree and swap it in once saved.
    /// A failed save leaves the live tree untouched.
    async fn commit<F>(&self, mutate: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Value) + Send,
    {
        let mut root = self.inner.write().await;
        let mut next = root.clone();
        mutate(&mut next);
        self.save(&next).await?;
        *root = next;
        Ok(())
    }
}

fn empty_tree() -> Value {
    Value::Object(Map::new())
}

fn get_node<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(root, |node, seg| node.as_object()?.get(*seg))
}

fn ensure_object(node: &mut Value) -> &mut Map<String, Value> {
    if !node.is_object() {
        *node = empty_tree();
    }
    match node {
        Value::Object(map) => map,
        _ => unreachable!("node was just made an object"),
    }
}

/// Object at `path`, creating it (and replacing non-object nodes) on the way down.
fn object_at<'a>(root: &'a mut Value, path: &[&str]) -> &'a mut Map<String, Value> {
    path.iter().fold(ensure_object(root), |map, seg| {
        ensure_object(map.entry((*seg).to_string()).or_insert_with(empty_tree))
    })
}

/// Remove the node at `path` and any ancestors left empty. Returns whether `node` is now empty.
fn remove_node(node: &mut Value, path: &[&str]) -> bool {
    let Value::Object(map) = node else { return false };
    match path {
        [] => {}
        [last] => {
            map.remove(*last);
        }
        [first, rest @ ..] => {
            let child_empty = map.get_mut(*first).map_or(false, |child| remove_node(child, rest));
            if child_empty {
                map.remove(*first);
            }
        }
    }
    map.is_empty()
}

fn set_node(root: &mut Value, path: &[&str], value: Value) {
    let Some((last, parents)) = path.split_last() else { return };
    if value.is_null() {
        remove_node(root, path);
        return;
    }
    object_at(root, parents).insert((*last).to_string(), value);
}

#[async_trait]
impl RecordStore for JsonTreeStore {
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let segs = segments(path)?;
        let root = self.inner.read().await;
        Ok(get_node(&root, &segs).cloned())
    }

    async fn create_with_generated_key(&self, collection: &str, value: Value) -> Result<String, StoreError> {
        let key = self.ids.next_id();
        let path = child_path(collection, &key)?;
        let segs = segments(&path)?;
        self.commit(|root| set_node(root, &segs, value)).await?;
        debug!(%path, "node created");
        Ok(key)
    }

    async fn merge_update(&self, collection: &str, key: &str, partial: Map<String, Value>) -> Result<(), StoreError> {
        let path = child_path(collection, key)?;
        let segs = segments(&path)?;
        self.commit(|root| {
            let node = object_at(root, &segs);
            for (field, value) in partial {
                if value.is_null() {
                    node.remove(&field);
                } else {
                    node.insert(field, value);
                }
            }
            if node.is_empty() {
                remove_node(root, &segs);
            }
        })
        .await?;
        debug!(%path, "node merged");
        Ok(())
    }

    async fn remove(&self, collection: &str, key: &str) -> Result<(), StoreError> {
        let path = child_path(collection, key)?;
        let segs = segments(&path)?;
        self.commit(|root| {
            remove_node(root, &segs);
        })
        .await?;
        debug!(%path, "node removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn obj(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("not an object"),
        }
    }

    #[tokio::test]
    async fn json_tree_store_crud_persists() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("json_tree_store_{}.json", uuid::Uuid::new_v4()));
        let store = JsonTreeStore::open(&tmp).await?;

        // initially empty
        assert!(store.list_all("articles").await?.is_empty());

        let a = store.create_with_generated_key("articles", json!({"codebar": "1"})).await?;
        let b = store.create_with_generated_key("articles", json!({"codebar": "2"})).await?;
        assert!(a < b);
        store.merge_update("articles", &a, obj(json!({"id": a}))).await?;
        assert_eq!(store.get_by_key("articles", &a).await?, Some(json!({"codebar": "1", "id": a})));

        store.remove("articles", &b).await?;
        let reloaded = JsonTreeStore::open(&tmp).await?;
        let entries = reloaded.list_all("articles").await?;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries.get(&a), Some(&json!({"codebar": "1", "id": a})));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn corrupt_file_is_rejected() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("json_tree_store_{}.json", uuid::Uuid::new_v4()));
        tokio::fs::write(&tmp, b"[1, 2").await?;
        assert!(matches!(JsonTreeStore::open(&tmp).await, Err(StoreError::Serialization(_))));
        tokio::fs::write(&tmp, b"[1, 2]").await?;
        assert!(matches!(JsonTreeStore::open(&tmp).await, Err(StoreError::Serialization(_))));
        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn unusable_data_dir_is_an_io_error() -> Result<(), anyhow::Error> {
        let blocker = std::env::temp_dir().join(format!("json_tree_store_{}", uuid::Uuid::new_v4()));
        tokio::fs::write(&blocker, b"not a directory").await?;
        assert!(matches!(JsonTreeStore::open(blocker.join("store.json")).await, Err(StoreError::Io(_))));
        let _ = tokio::fs::remove_file(&blocker).await;
        Ok(())
    }

    #[tokio::test]
    async fn list_all_is_ordered_by_key() -> Result<(), StoreError> {
        let store = JsonTreeStore::with_data(json!({"articles": {"b": {"n": 2}, "a": {"n": 1}, "c": {"n": 3}}}));
        let keys: Vec<String> = store.list_all("articles").await?.into_keys().collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
        Ok(())
    }

    #[tokio::test]
    async fn missing_nodes_read_as_absent() -> Result<(), StoreError> {
        let store = JsonTreeStore::with_data(json!({"articles": {"a": "scalar"}}));
        assert_eq!(store.read("services").await?, None);
        assert_eq!(store.get_by_key("articles", "zzz").await?, None);
        assert_eq!(store.read("articles/a/deeper").await?, None);
        assert!(store.list_all("articles/a").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn find_by_field_matches_equal_values_only() -> Result<(), StoreError> {
        let store = JsonTreeStore::with_data(json!({"articles": {
            "a": {"codebar": "111"},
            "b": {"codebar": 111},
            "c": {"codebar": "222"},
            "d": "not an object"
        }}));
        let hits = store.find_by_field("articles", "codebar", &json!("111")).await?;
        assert_eq!(hits.keys().collect::<Vec<_>>(), vec!["a"]);
        assert!(store.find_by_field("nothing", "codebar", &json!("111")).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn merge_update_is_shallow() -> Result<(), StoreError> {
        let store = JsonTreeStore::with_data(json!({"articles": {"k": {"name": "Pen", "price": 2, "tags": {"x": 1}}}}));
        store.merge_update("articles", "k", obj(json!({"price": 3, "tags": {"y": 2}, "name": null}))).await?;
        assert_eq!(store.get_by_key("articles", "k").await?, Some(json!({"price": 3, "tags": {"y": 2}})));
        Ok(())
    }

    #[tokio::test]
    async fn merge_update_creates_absent_key() -> Result<(), StoreError> {
        let store = JsonTreeStore::in_memory();
        store.merge_update("articles", "new", obj(json!({"id": "new"}))).await?;
        assert_eq!(store.get_by_key("articles", "new").await?, Some(json!({"id": "new"})));
        Ok(())
    }

    #[tokio::test]
    async fn remove_prunes_empty_parents_and_is_idempotent() -> Result<(), StoreError> {
        let store = JsonTreeStore::with_data(json!({"articles": {"k": {"name": "Pen"}}, "services": [1]}));
        store.remove("articles", "k").await?;
        store.remove("articles", "k").await?;
        assert_eq!(store.snapshot().await, json!({"services": [1]}));
        Ok(())
    }

    #[tokio::test]
    async fn invalid_keys_are_rejected() {
        let store = JsonTreeStore::in_memory();
        assert!(matches!(store.get_by_key("articles", "a.b").await, Err(StoreError::InvalidPath(_))));
        assert!(matches!(store.remove("articles", "a[0]").await, Err(StoreError::InvalidPath(_))));
    }

    #[tokio::test]
    async fn keys_never_address_more_than_one_record() -> Result<(), StoreError> {
        let seed = json!({"articles": {"K1": {"name": "Pen"}, "K2": {"name": "Ink"}}});
        let store = JsonTreeStore::with_data(seed.clone());

        assert!(matches!(store.get_by_key("articles", "K1/name").await, Err(StoreError::InvalidPath(_))));
        assert!(matches!(store.remove("articles", "/").await, Err(StoreError::InvalidPath(_))));
        assert!(matches!(store.remove("articles", "").await, Err(StoreError::InvalidPath(_))));
        assert!(matches!(
            store.merge_update("articles", "K2/name", obj(json!({"price": 9}))).await,
            Err(StoreError::InvalidPath(_))
        ));

        assert_eq!(store.snapshot().await, seed);
        Ok(())
    }

    #[tokio::test]
    async fn failed_save_leaves_tree_unchanged() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("json_tree_store_{}", uuid::Uuid::new_v4()));
        let store = JsonTreeStore::open(dir.join("store.json")).await?;
        store.create_with_generated_key("articles", json!({"codebar": "1"})).await?;
        let before = store.snapshot().await;

        tokio::fs::remove_dir_all(&dir).await?;

        assert!(matches!(
            store.create_with_generated_key("articles", json!({"codebar": "2"})).await,
            Err(StoreError::Io(_))
        ));
        let key = store.list_all("articles").await?.into_keys().next().unwrap_or_default();
        assert!(matches!(
            store.merge_update("articles", &key, obj(json!({"codebar": "3"}))).await,
            Err(StoreError::Io(_))
        ));
        assert!(matches!(store.remove("articles", &key).await, Err(StoreError::Io(_))));

        assert_eq!(store.snapshot().await, before);
        Ok(())
    }
}
