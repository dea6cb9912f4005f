use axum::{Json, extract::State};
use std::sync::Arc;

use super::extract::{JsonBody, PathParam, QueryParams};
use super::validation::{normalize_limit, normalize_page, validate_user_id};
use super::{
    ActivityLogsResponse, ApiError, AppState, LimitQuery, MessageResponse, PageQuery, Pagination,
    PopularMoviesResponse, UpdateUserRequest, UserUpdatedResponse, UsersResponse,
};
use crate::constants::limits::{
    DEFAULT_ACTIVITY_LIMIT, DEFAULT_POPULAR_LIMIT, DEFAULT_USERS_PAGE_SIZE,
};
use crate::services::{DashboardStats, UserUpdate};

/// GET /admin/dashboard
pub async fn dashboard(
    State(state): State<Arc<AppState>>,
) -> Result<Json<DashboardStats>, ApiError> {
    Ok(Json(state.admin_service().dashboard_stats().await?))
}

/// GET /admin/activity-logs?limit=
pub async fn activity_logs(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<LimitQuery>,
) -> Result<Json<ActivityLogsResponse>, ApiError> {
    let limit = normalize_limit(query.limit, DEFAULT_ACTIVITY_LIMIT);
    let logs = state.admin_service().activity_logs(limit).await?;
    Ok(Json(ActivityLogsResponse { logs }))
}

/// GET /admin/users?page=&limit=
pub async fn list_users(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<Json<UsersResponse>, ApiError> {
    let page = normalize_page(query.page);
    let limit = normalize_limit(query.limit, DEFAULT_USERS_PAGE_SIZE);

    let result = state.admin_service().list_users(page, limit).await?;

    Ok(Json(UsersResponse {
        users: result.users,
        pagination: Pagination::new(result.total, page, limit),
    }))
}

/// PUT /admin/users/{user_id}
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    PathParam(user_id): PathParam<i32>,
    JsonBody(payload): JsonBody<UpdateUserRequest>,
) -> Result<Json<UserUpdatedResponse>, ApiError> {
    let user_id = validate_user_id(user_id)?;
    let user = state
        .admin_service()
        .update_user(
            user_id,
            UserUpdate {
                username: payload.username,
                email: payload.email,
            },
        )
        .await?;

    Ok(Json(UserUpdatedResponse {
        message: "User updated successfully".to_string(),
        user: user.into(),
    }))
}

/// DELETE /admin/users/{user_id}
pub async fn delete_user(
    State(state): State<Arc<AppState>>,
    PathParam(user_id): PathParam<i32>,
) -> Result<Json<MessageResponse>, ApiError> {
    let user_id = validate_user_id(user_id)?;
    state.admin_service().delete_user(user_id).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}

/// GET /admin/popular-movies?limit=
pub async fn popular_movies(
    State(state): State<Arc<AppState>>,
    QueryParams(query): QueryParams<LimitQuery>,
) -> Result<Json<PopularMoviesResponse>, ApiError> {
    let limit = normalize_limit(query.limit, DEFAULT_POPULAR_LIMIT);
    let movies = state.admin_service().popular_movies(limit).await?;
    Ok(Json(PopularMoviesResponse { movies }))
}
