pub mod activity;
pub mod token;
pub mod user;
pub mod watchlist;
