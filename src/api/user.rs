use axum::{Extension, Json, extract::State, http::StatusCode};
use std::sync::Arc;

use super::extract::{JsonBody, PathParam, QueryParams};
use super::validation::{
    normalize_limit, normalize_page, parse_status_filter, validate_movie_id, validate_status,
};
use super::{
    AddWatchlistRequest, ApiError, AppState, MessageResponse, Pagination, ProfilePhotoRequest,
    UpdateStatusRequest, UserUpdatedResponse, WatchlistItemResponse, WatchlistQuery,
    WatchlistResponse,
};
use crate::constants::limits::DEFAULT_WATCHLIST_PAGE_SIZE;
use crate::db::NewWatchlistEntry;
use crate::domain::Identity;
use crate::services::WatchlistStats;

/// PUT /user/profile/photo
pub async fn update_profile_photo(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    JsonBody(payload): JsonBody<ProfilePhotoRequest>,
) -> Result<Json<UserUpdatedResponse>, ApiError> {
    let user = state
        .auth_service()
        .update_profile_photo(identity.id, payload.profile_photo)
        .await?;

    Ok(Json(UserUpdatedResponse {
        message: "Profile photo updated".to_string(),
        user: user.into(),
    }))
}

/// GET /user/watchlist?status=&page=&limit=
pub async fn list_watchlist(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    QueryParams(query): QueryParams<WatchlistQuery>,
) -> Result<Json<WatchlistResponse>, ApiError> {
    let status = parse_status_filter(query.status.as_deref())?;
    let page = normalize_page(query.page);
    let limit = normalize_limit(query.limit, DEFAULT_WATCHLIST_PAGE_SIZE);

    let result = state
        .watchlist_service()
        .list(identity.id, status, page, limit)
        .await?;

    Ok(Json(WatchlistResponse {
        watchlist: result.items,
        pagination: Pagination::new(result.total, page, limit),
    }))
}

/// POST /user/watchlist
pub async fn add_to_watchlist(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    JsonBody(payload): JsonBody<AddWatchlistRequest>,
) -> Result<(StatusCode, Json<WatchlistItemResponse>), ApiError> {
    let movie_id = payload
        .movie_id
        .ok_or_else(|| ApiError::validation("movie_id is required"))?;
    let movie_id = validate_movie_id(movie_id)?;

    let entry = state
        .watchlist_service()
        .add(
            identity.id,
            NewWatchlistEntry {
                movie_id,
                title: payload.title,
                poster_path: payload.poster_path,
                release_date: payload.release_date,
                vote_average: payload.vote_average,
                overview: payload.overview,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(WatchlistItemResponse {
            message: "Movie added to watchlist".to_string(),
            watchlist_item: entry,
        }),
    ))
}

/// DELETE /user/watchlist/{movie_id}
pub async fn remove_from_watchlist(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    PathParam(movie_id): PathParam<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    let movie_id = validate_movie_id(movie_id)?;
    state
        .watchlist_service()
        .remove(identity.id, movie_id)
        .await?;

    Ok(Json(MessageResponse::new("Movie removed from watchlist")))
}

/// PATCH /user/watchlist/{movie_id}
pub async fn update_watchlist_status(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    PathParam(movie_id): PathParam<i64>,
    JsonBody(payload): JsonBody<UpdateStatusRequest>,
) -> Result<Json<WatchlistItemResponse>, ApiError> {
    let movie_id = validate_movie_id(movie_id)?;
    let status = payload
        .status
        .as_deref()
        .ok_or_else(|| ApiError::validation("status is required"))
        .and_then(validate_status)?;

    let entry = state
        .watchlist_service()
        .update_status(identity.id, movie_id, status)
        .await?;

    Ok(Json(WatchlistItemResponse {
        message: "Watchlist status updated".to_string(),
        watchlist_item: entry,
    }))
}

/// GET /user/stats
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<Json<WatchlistStats>, ApiError> {
    let stats = state.watchlist_service().stats(identity.id).await?;
    Ok(Json(stats))
}
