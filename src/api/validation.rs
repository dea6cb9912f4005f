use super::ApiError;
use crate::constants::limits::MAX_PAGE_SIZE;
use crate::domain::{UserId, WatchStatus};

pub fn validate_movie_id(id: i64) -> Result<i64, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid movie ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(id)
}

pub fn validate_user_id(id: i32) -> Result<UserId, ApiError> {
    if id <= 0 {
        return Err(ApiError::validation(format!(
            "Invalid user ID: {id}. ID must be a positive integer"
        )));
    }
    Ok(UserId::new(id))
}

/// Page numbers start at 1; 0 is treated as 1.
#[must_use]
pub fn normalize_page(page: Option<u64>) -> u64 {
    page.unwrap_or(1).max(1)
}

/// Falls back to `default` when absent and clamps into `1..=MAX_PAGE_SIZE`.
#[must_use]
pub fn normalize_limit(limit: Option<u64>, default: u64) -> u64 {
    limit.unwrap_or(default).clamp(1, MAX_PAGE_SIZE)
}

pub fn validate_status(status: &str) -> Result<WatchStatus, ApiError> {
    status.parse::<WatchStatus>().map_err(ApiError::validation)
}

/// An empty `?status=` means no filter.
pub fn parse_status_filter(status: Option<&str>) -> Result<Option<WatchStatus>, ApiError> {
    match status.map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => validate_status(s).map(Some),
    }
}

pub fn validate_search_query(query: Option<&str>) -> Result<&str, ApiError> {
    let trimmed = query.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(ApiError::validation("Search query is required"));
    }
    Ok(trimmed)
}
