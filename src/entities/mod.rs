pub mod prelude;

pub mod activity_logs;
pub mod tokens;
pub mod users;
pub mod watchlist;
