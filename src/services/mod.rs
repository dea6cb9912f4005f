pub mod activity;
pub use activity::ActivityLogger;

pub mod token;
pub use token::{TokenError, TokenService};

pub mod catalog;
pub use catalog::{CatalogError, MovieCatalog};

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AuthError, AuthService, AuthSession, Registration};
pub use auth_service_impl::SeaOrmAuthService;

pub mod watchlist_service;
pub mod watchlist_service_impl;
pub use watchlist_service::{WatchlistError, WatchlistPage, WatchlistService, WatchlistStats};
pub use watchlist_service_impl::SeaOrmWatchlistService;

pub mod admin_service;
pub mod admin_service_impl;
pub use admin_service::{
    AdminError, AdminService, DashboardStats, UserUpdate, UserWithCounts, UsersPage,
};
pub use admin_service_impl::SeaOrmAdminService;
