use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, StatusCode, header},
    middleware,
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::domain::Role;
use crate::services::{AdminService, AuthService, MovieCatalog, WatchlistService};
use crate::state::SharedState;

mod admin;
pub mod auth;
mod error;
mod extract;
mod movies;
mod observability;
mod system;
mod types;
mod user;
mod validation;

pub use error::ApiError;
pub use types::*;

use metrics_exporter_prometheus::PrometheusHandle;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn watchlist_service(&self) -> &Arc<dyn WatchlistService> {
        &self.shared.watchlist_service
    }

    #[must_use]
    pub fn admin_service(&self) -> &Arc<dyn AdminService> {
        &self.shared.admin_service
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<dyn MovieCatalog> {
        &self.shared.catalog
    }
}

#[must_use]
pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> Arc<AppState> {
    Arc::new(AppState {
        shared,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    })
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

/// Builds state around a caller-supplied catalog instead of TMDB.
pub async fn create_app_state_with_catalog(
    config: Config,
    catalog: Arc<dyn MovieCatalog>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::with_catalog(config, catalog).await?);
    Ok(create_app_state(shared, prometheus_handle))
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors_origins = state.config().server.cors_allowed_origins.clone();
    let body_limit = state.config().server.body_limit_bytes;

    let api_router = Router::new()
        .nest("/auth", auth_router(state.clone()))
        .nest("/user", user_router(state.clone()))
        .nest("/admin", admin_router(state.clone()))
        .nest("/public", public_router())
        .route("/health", get(system::health))
        .with_state(state.clone());

    let cors_layer = if cors_origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    Router::new()
        .nest("/api", api_router)
        .route("/", get(system::root))
        .fallback(route_not_found)
        .layer(
            cors_layer
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]),
        )
        // Extractors carry their own 2 MB cap; replace it with the configured one.
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(middleware::from_fn(
            observability::security_headers_middleware,
        ))
        .layer(middleware::from_fn(observability::logging_middleware))
        .layer(TraceLayer::new_for_http())
}

fn auth_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    let authenticated = Router::new()
        .route("/profile", get(auth::profile))
        .route("/logout", post(auth::logout))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware));

    Router::new()
        .route("/register/user", post(auth::register_user))
        .route("/register/admin", post(auth::register_admin))
        .route("/login", post(auth::login))
        .route("/login/user", post(auth::login_user))
        .route("/login/admin", post(auth::login_admin))
        .merge(authenticated)
}

fn user_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/profile", get(auth::profile))
        .route("/profile/photo", put(user::update_profile_photo))
        .route("/movies/search", get(movies::search))
        .route("/movies/popular", get(movies::popular))
        .route("/movies/now-playing", get(movies::now_playing))
        .route("/movies/{movie_id}", get(movies::details_for_user))
        .route("/watchlist", get(user::list_watchlist))
        .route("/watchlist", post(user::add_to_watchlist))
        .route("/watchlist/{movie_id}", delete(user::remove_from_watchlist))
        .route("/watchlist/{movie_id}", patch(user::update_watchlist_status))
        .route("/stats", get(user::get_stats))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}

fn admin_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/dashboard", get(admin::dashboard))
        .route("/activity-logs", get(admin::activity_logs))
        .route("/profile", get(auth::profile))
        .route("/users", get(admin::list_users))
        .route("/users/{user_id}", put(admin::update_user))
        .route("/users/{user_id}", delete(admin::delete_user))
        .route("/popular-movies", get(admin::popular_movies))
        .route("/metrics", get(observability::get_metrics))
        // Layers run outside-in: authenticate first, then check the role.
        .route_layer(middleware::from_fn_with_state(Role::Admin, auth::require_role))
        .route_layer(middleware::from_fn_with_state(state, auth::auth_middleware))
}

fn public_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/movies/search", get(movies::search))
        .route("/movies/popular", get(movies::popular))
        .route("/movies/now-playing", get(movies::now_playing))
        .route("/movies/{movie_id}", get(movies::details))
}

async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        axum::Json(MessageResponse::new("Route not found")),
    )
}
