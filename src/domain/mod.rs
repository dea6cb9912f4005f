//! Domain primitives shared by the persistence, service and HTTP layers.
//!
//! The enums here double as `SeaORM` active enums so the stored string values
//! (`"user"`, `"watched"`, `"LOGIN"`, ...) never drift from the wire format.

use sea_orm::sea_query::StringLen;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a user account.
///
/// Wraps the raw `i32` primary key so it cannot be confused with a catalog
/// movie id at call sites.
///
/// # Examples
///
/// ```rust
/// use cinelist::domain::UserId;
///
/// let id = UserId::new(7);
/// assert_eq!(id.value(), 7);
/// assert_eq!(id.to_string(), "7");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct UserId(i32);

impl UserId {
    #[must_use]
    pub const fn new(id: i32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn value(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for i32 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

impl From<i32> for UserId {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

impl Serialize for UserId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_i32(self.0)
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let id = i32::deserialize(deserializer)?;
        Ok(Self::new(id))
    }
}

/// Account role. Decides which login endpoint accepts the account and which
/// route groups the account's tokens may reach.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "user")]
    User,
    #[sea_orm(string_value = "admin")]
    Admin,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
        }
    }
}

/// Lifecycle of a saved movie.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum WatchStatus {
    #[default]
    #[sea_orm(string_value = "watchlist")]
    Watchlist,
    #[sea_orm(string_value = "watched")]
    Watched,
}

impl WatchStatus {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Watchlist => "watchlist",
            Self::Watched => "watched",
        }
    }
}

impl FromStr for WatchStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "watchlist" => Ok(Self::Watchlist),
            "watched" => Ok(Self::Watched),
            other => Err(format!(
                "Invalid status '{other}'. Expected 'watchlist' or 'watched'"
            )),
        }
    }
}

/// Kind of user activity recorded in the append-only activity log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(50))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActivityAction {
    #[sea_orm(string_value = "LOGIN")]
    Login,
    #[sea_orm(string_value = "ADD_WATCHLIST")]
    AddWatchlist,
    #[sea_orm(string_value = "REMOVE_WATCHLIST")]
    RemoveWatchlist,
    #[sea_orm(string_value = "WATCHED")]
    Watched,
}

impl ActivityAction {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Login => "LOGIN",
            Self::AddWatchlist => "ADD_WATCHLIST",
            Self::RemoveWatchlist => "REMOVE_WATCHLIST",
            Self::Watched => "WATCHED",
        }
    }
}

/// Identity asserted by a verified token and attached to authenticated requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub username: String,
    pub role: Role,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watch_status_parsing() {
        assert_eq!("watched".parse::<WatchStatus>(), Ok(WatchStatus::Watched));
        assert_eq!(
            "watchlist".parse::<WatchStatus>(),
            Ok(WatchStatus::Watchlist)
        );
        assert!("WATCHED".parse::<WatchStatus>().is_err());
        assert!("".parse::<WatchStatus>().is_err());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"user\"").unwrap(),
            Role::User
        );
    }

    #[test]
    fn test_activity_action_wire_format() {
        assert_eq!(
            serde_json::to_string(&ActivityAction::AddWatchlist).unwrap(),
            "\"ADD_WATCHLIST\""
        );
        assert_eq!(ActivityAction::Login.as_str(), "LOGIN");
    }

    #[test]
    fn test_user_id_roundtrip() {
        let id: UserId = serde_json::from_str("42").unwrap();
        assert_eq!(id, UserId::new(42));
        assert_eq!(i32::from(id), 42);
    }
}
