use axum::Json;
use serde_json::{Value, json};

use super::HealthResponse;

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK",
        message: "Movie Watchlist API is running",
    })
}

/// GET /
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Welcome to Movie Watchlist API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "auth": "/api/auth",
            "user": "/api/user",
            "admin": "/api/admin",
            "public": "/api/public",
        }
    }))
}
