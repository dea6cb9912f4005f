//! Read-only proxy over the movie catalog, mounted both publicly and behind
//! authentication. The authenticated detail view adds watchlist membership.

use axum::{Extension, Json, extract::State};
use serde_json::Value;
use std::sync::Arc;

use super::extract::{PathParam, QueryParams};
use super::validation::{validate_movie_id, validate_search_query};
use super::{ApiError, AppState, CatalogPageQuery, SearchQuery};
use crate::domain::Identity;

/// GET /movies/search?query=&page=
pub async fn search(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> Result<Json<Value>, ApiError> {
    let term = validate_search_query(query.query.as_deref())?;
    let results = state
        .catalog()
        .search(term, query.page.unwrap_or(1).max(1))
        .await?;
    Ok(Json(results))
}

/// GET /movies/popular?page=
pub async fn popular(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<CatalogPageQuery>,
) -> Result<Json<Value>, ApiError> {
    let results = state
        .catalog()
        .popular(query.page.unwrap_or(1).max(1))
        .await?;
    Ok(Json(results))
}

/// GET /movies/now-playing?page=
pub async fn now_playing(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<CatalogPageQuery>,
) -> Result<Json<Value>, ApiError> {
    let results = state
        .catalog()
        .now_playing(query.page.unwrap_or(1).max(1))
        .await?;
    Ok(Json(results))
}

/// GET /public/movies/{movie_id}
pub async fn details(
    State(state): State<Arc<AppState>>,
    PathParam(movie_id): PathParam<i64>,
) -> Result<Json<Value>, ApiError> {
    let movie_id = validate_movie_id(movie_id)?;
    let movie = state.catalog().details(movie_id).await?;
    Ok(Json(movie))
}

/// GET /user/movies/{movie_id}
pub async fn details_for_user(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    PathParam(movie_id): PathParam<i64>,
) -> Result<Json<Value>, ApiError> {
    let movie_id = validate_movie_id(movie_id)?;
    let mut movie = state.catalog().details(movie_id).await?;
    let status = state
        .watchlist_service()
        .status_for(identity.id, movie_id)
        .await?;

    if let Value::Object(fields) = &mut movie {
        fields.insert("inWatchlist".to_string(), Value::Bool(status.is_some()));
        fields.insert(
            "watchlistStatus".to_string(),
            status.map_or(Value::Null, |s| Value::String(s.as_str().to_string())),
        );
    }

    Ok(Json(movie))
}
