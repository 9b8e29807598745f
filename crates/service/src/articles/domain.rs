use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use super::errors::ArticleError;

/// Fields every new article must carry, in the order reported to clients.
pub const REQUIRED_FIELDS: [&str; 5] = ["name", "description", "brand", "codebar", "price"];

/// Price as sent by clients: a JSON number kept verbatim, or free text.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Price {
    Number(Number),
    Text(String),
}

impl Price {
    /// Zero and blank text count as "no price".
    pub fn is_empty(&self) -> bool {
        match self {
            Price::Number(n) => n.as_f64() == Some(0.0),
            Price::Text(s) => s.trim().is_empty(),
        }
    }
}

impl From<i64> for Price {
    fn from(v: i64) -> Self {
        Price::Number(v.into())
    }
}

impl From<&str> for Price {
    fn from(v: &str) -> Self {
        Price::Text(v.to_string())
    }
}

/// A stored article, including the store-generated `id`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub name: String,
    pub description: String,
    pub brand: String,
    pub codebar: String,
    pub price: Price,
}

/// Validated input for a new article.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewArticle {
    pub name: String,
    pub description: String,
    pub brand: String,
    pub codebar: String,
    pub price: Price,
}

impl NewArticle {
    pub fn with_id(self, id: String) -> Article {
        Article {
            id,
            name: self.name,
            description: self.description,
            brand: self.brand,
            codebar: self.codebar,
            price: self.price,
        }
    }
}

/// Body of a create request. Every field is optional here so that
/// missing ones are reported together by [`CreateArticleRequest::validate`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CreateArticleRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub codebar: Option<String>,
    pub price: Option<Price>,
}

fn non_blank(v: Option<String>) -> Option<String> {
    v.filter(|s| !s.trim().is_empty())
}

impl CreateArticleRequest {
    pub fn validate(self) -> Result<NewArticle, ArticleError> {
        let (Some(name), Some(description), Some(brand), Some(codebar), Some(price)) = (
            non_blank(self.name),
            non_blank(self.description),
            non_blank(self.brand),
            non_blank(self.codebar),
            self.price.filter(|p| !p.is_empty()),
        ) else {
            return Err(ArticleError::Validation { required_fields: REQUIRED_FIELDS.to_vec() });
        };
        Ok(NewArticle { name, description, brand, codebar, price })
    }
}

/// Body of an update request: the `id` to update plus any subset of fields.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UpdateArticleRequest {
    pub id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub brand: Option<String>,
    pub codebar: Option<String>,
    pub price: Option<Price>,
}

/// Supplied update fields for one article, keyed by field name.
#[derive(Clone, Debug, PartialEq)]
pub struct ArticlePatch {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl UpdateArticleRequest {
    pub fn into_patch(self) -> Result<ArticlePatch, ArticleError> {
        let id = non_blank(self.id).ok_or_else(ArticleError::missing_id)?;
        let mut fields = Map::new();
        let texts = [
            ("name", self.name),
            ("description", self.description),
            ("brand", self.brand),
            ("codebar", self.codebar),
        ];
        for (field, value) in texts {
            if let Some(v) = value {
                fields.insert(field.to_string(), Value::String(v));
            }
        }
        if let Some(price) = self.price {
            let v = match price {
                Price::Number(n) => Value::Number(n),
                Price::Text(s) => Value::String(s),
            };
            fields.insert("price".to_string(), v);
        }
        Ok(ArticlePatch { id, fields })
    }
}
