use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use common::Envelope;
use service::articles::{domain::REQUIRED_FIELDS, Article, CreateArticleRequest, UpdateArticleRequest};

use crate::errors::ApiError;
use crate::state::AppState;

#[derive(Deserialize, Debug, Default)]
pub struct IdQuery {
    pub id: Option<String>,
}

/// `{message:"success", statusCode:200, deleted_id}`
#[derive(Serialize, Debug)]
pub struct DeletedEnvelope {
    pub message: &'static str,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub deleted_id: String,
}

fn require_id(query: Result<Query<IdQuery>, QueryRejection>) -> Result<String, ApiError> {
    let id = match query {
        Ok(Query(q)) => q.id,
        Err(rejection) => {
            debug!(%rejection, "unreadable query string");
            None
        }
    };
    id.filter(|id| !id.trim().is_empty()).ok_or_else(|| ApiError::Validation { required_fields: vec!["id"] })
}

pub async fn list_articles(
    State(state): State<AppState>,
) -> Result<Json<Envelope<Vec<Map<String, Value>>>>, ApiError> {
    let articles = state.articles.list().await?;
    Ok(Json(Envelope::success(200, articles)))
}

pub async fn create_article(
    State(state): State<AppState>,
    payload: Result<Json<CreateArticleRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Envelope<Article>>), ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        debug!(%rejection, "unreadable create body");
        ApiError::Validation { required_fields: REQUIRED_FIELDS.to_vec() }
    })?;
    let created = state.articles.create(req.validate()?).await?;
    Ok((StatusCode::CREATED, Json(Envelope::success(201, created))))
}

pub async fn get_article(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> Result<Json<Envelope<Value>>, ApiError> {
    let id = require_id(query)?;
    let article = state.articles.get(&id).await?;
    Ok(Json(Envelope::success(200, article)))
}

pub async fn update_article(
    State(state): State<AppState>,
    payload: Result<Json<UpdateArticleRequest>, JsonRejection>,
) -> Result<Json<Envelope<Map<String, Value>>>, ApiError> {
    let Json(req) = payload.map_err(|rejection| {
        debug!(%rejection, "unreadable update body");
        ApiError::Validation { required_fields: vec!["id"] }
    })?;
    let merged = state.articles.update(req.into_patch()?).await?;
    Ok(Json(Envelope::success(200, merged)))
}

pub async fn delete_article(
    State(state): State<AppState>,
    query: Result<Query<IdQuery>, QueryRejection>,
) -> Result<Json<DeletedEnvelope>, ApiError> {
    let id = require_id(query)?;
    let deleted_id = state.articles.delete(&id).await?;
    Ok(Json(DeletedEnvelope { message: "success", status_code: 200, deleted_id }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_id_is_rejected() {
        let q = Ok(Query(IdQuery { id: Some("  ".into()) }));
        assert!(matches!(require_id(q), Err(ApiError::Validation { .. })));
        assert!(matches!(require_id(Ok(Query(IdQuery::default()))), Err(ApiError::Validation { .. })));
    }

    #[test]
    fn present_id_is_returned() {
        let q = Ok(Query(IdQuery { id: Some("-Nabc".into()) }));
        assert_eq!(require_id(q).unwrap(), "-Nabc");
    }
}
