use serde::{Deserialize, Serialize};

use crate::db::{ActivityEntry, PopularMovie, User, WatchlistEntry};
use crate::domain::{Role, UserId};
use crate::services::UserWithCounts;

/// Body of every error response and of plain acknowledgements.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl Pagination {
    #[must_use]
    pub const fn new(total: u64, page: u64, limit: u64) -> Self {
        Self {
            total,
            page,
            limit,
            total_pages: if limit == 0 { 0 } else { total.div_ceil(limit) },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<u64>,
}

// ============================================================================
// Auth
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    pub email: Option<String>,
    pub profile_photo: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

/// Account fields returned alongside a token.
#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: UserId,
    pub username: String,
    pub email: Option<String>,
    pub role: Role,
    pub profile_photo: Option<String>,
}

impl From<User> for UserSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            role: user.role,
            profile_photo: user.profile_photo,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub message: String,
    pub token: String,
    pub user: UserSummary,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct UserUpdatedResponse {
    pub message: String,
    pub user: UserSummary,
}

#[derive(Debug, Deserialize)]
pub struct ProfilePhotoRequest {
    pub profile_photo: Option<String>,
}

// ============================================================================
// Watchlist
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct WatchlistQuery {
    pub status: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct AddWatchlistRequest {
    pub movie_id: Option<i64>,
    #[serde(default)]
    pub title: String,
    pub poster_path: Option<String>,
    pub release_date: Option<String>,
    pub vote_average: Option<f64>,
    pub overview: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct WatchlistResponse {
    pub watchlist: Vec<WatchlistEntry>,
    pub pagination: Pagination,
}

#[derive(Debug, Serialize)]
pub struct WatchlistItemResponse {
    pub message: String,
    #[serde(rename = "watchlistItem")]
    pub watchlist_item: WatchlistEntry,
}

// ============================================================================
// Catalog
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
    pub page: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CatalogPageQuery {
    pub page: Option<u32>,
}

// ============================================================================
// Admin
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ActivityLogsResponse {
    pub logs: Vec<ActivityEntry>,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users: Vec<UserWithCounts>,
    pub pagination: Pagination,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct PopularMoviesResponse {
    pub movies: Vec<PopularMovie>,
}

// ============================================================================
// System
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_rounds_up() {
        assert_eq!(Pagination::new(41, 1, 20).total_pages, 3);
        assert_eq!(Pagination::new(40, 2, 20).total_pages, 2);
        assert_eq!(Pagination::new(0, 1, 20).total_pages, 0);
    }

    #[test]
    fn test_pagination_wire_names() {
        let json = serde_json::to_value(Pagination::new(1, 1, 20)).unwrap();
        assert_eq!(json["totalPages"], 1);
        assert!(json.get("total_pages").is_none());
    }
}
