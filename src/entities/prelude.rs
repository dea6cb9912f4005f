pub use super::activity_logs::Entity as ActivityLogs;
pub use super::tokens::Entity as Tokens;
pub use super::users::Entity as Users;
pub use super::watchlist::Entity as Watchlist;
