//! Article records: request schemas, business errors and the CRUD service.

pub mod domain;
pub mod errors;
pub mod service;

pub use domain::{Article, ArticlePatch, CreateArticleRequest, NewArticle, Price, UpdateArticleRequest};
pub use errors::ArticleError;
pub use service::{ArticleService, ARTICLES};
