use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::domain::{Article, ArticlePatch, NewArticle, REQUIRED_FIELDS};
use super::errors::ArticleError;
use crate::errors::StoreError;
use crate::store::{is_valid_key, RecordStore};

/// Collection holding every article, keyed by generated id.
pub const ARTICLES: &str = "articles";

/// CRUD over article records. Holds no state besides the store handle,
/// so every call reads fresh data.
#[derive(Clone)]
pub struct ArticleService {
    store: Arc<dyn RecordStore>,
}

impl ArticleService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// All articles in key order, each carrying its storage key as `id`.
    pub async fn list(&self) -> Result<Vec<Map<String, Value>>, ArticleError> {
        let entries = self.store.list_all(ARTICLES).await?;
        let mut articles = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            match value {
                Value::Object(mut fields) => {
                    fields.insert("id".to_string(), Value::String(key));
                    articles.push(fields);
                }
                other => warn!(%key, kind = json_kind(&other), "skipping non-object article node"),
            }
        }
        Ok(articles)
    }

    /// Create an article after checking its codebar is unused.
    ///
    /// The check and the write are separate store calls, so two concurrent
    /// creates with the same codebar can both succeed.
    pub async fn create(&self, input: NewArticle) -> Result<Article, ArticleError> {
        let codebar = Value::String(input.codebar.clone());
        let existing = self.store.find_by_field(ARTICLES, "codebar", &codebar).await?;
        if !existing.is_empty() {
            info!(codebar = %input.codebar, "rejecting duplicated codebar");
            return Err(ArticleError::DuplicateCodebar { codebar: input.codebar });
        }

        let value = serde_json::to_value(&input).map_err(StoreError::serialization)?;
        let id = self.store.create_with_generated_key(ARTICLES, value).await?;
        let mut id_field = Map::new();
        id_field.insert("id".to_string(), Value::String(id.clone()));
        self.store.merge_update(ARTICLES, &id, id_field).await?;

        info!(%id, codebar = %input.codebar, "article created");
        Ok(input.with_id(id))
    }

    /// The stored record, verbatim.
    pub async fn get(&self, id: &str) -> Result<Value, ArticleError> {
        ensure_key(id)?;
        self.store
            .get_by_key(ARTICLES, id)
            .await?
            .ok_or_else(|| ArticleError::NotFound { id: id.to_string() })
    }

    /// Merge the supplied fields over the stored record and write the full result back.
    /// The codebar is not re-checked for uniqueness here.
    pub async fn update(&self, patch: ArticlePatch) -> Result<Map<String, Value>, ArticleError> {
        ensure_key(&patch.id)?;
        let existing = match self.store.get_by_key(ARTICLES, &patch.id).await? {
            Some(Value::Object(fields)) => fields,
            Some(_) => Map::new(),
            None => return Err(ArticleError::NotFound { id: patch.id }),
        };

        let mut merged = Map::new();
        merged.insert("id".to_string(), Value::String(patch.id.clone()));
        for field in REQUIRED_FIELDS {
            let value = patch
                .fields
                .get(field)
                .filter(|v| !v.is_null())
                .or_else(|| existing.get(field))
                .cloned();
            if let Some(v) = value {
                merged.insert(field.to_string(), v);
            }
        }

        self.store.merge_update(ARTICLES, &patch.id, merged.clone()).await?;
        debug!(id = %patch.id, fields = patch.fields.len(), "article updated");
        Ok(merged)
    }

    /// Remove an existing article, returning its id.
    pub async fn delete(&self, id: &str) -> Result<String, ArticleError> {
        ensure_key(id)?;
        if self.store.get_by_key(ARTICLES, id).await?.is_none() {
            return Err(ArticleError::NotFound { id: id.to_string() });
        }
        self.store.remove(ARTICLES, id).await?;
        info!(%id, "article deleted");
        Ok(id.to_string())
    }
}

// An id that cannot name a single record names no article.
fn ensure_key(id: &str) -> Result<(), ArticleError> {
    if is_valid_key(id) {
        Ok(())
    } else {
        Err(ArticleError::NotFound { id: id.to_string() })
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
