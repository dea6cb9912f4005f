pub mod limits {

    pub const DEFAULT_WATCHLIST_PAGE_SIZE: u64 = 20;

    pub const DEFAULT_USERS_PAGE_SIZE: u64 = 50;

    pub const DEFAULT_ACTIVITY_LIMIT: u64 = 20;

    pub const DEFAULT_POPULAR_LIMIT: u64 = 20;

    /// Upper bound for any client-supplied `limit` query parameter.
    pub const MAX_PAGE_SIZE: u64 = 100;
}

pub mod admin {

    pub const DEFAULT_ADMIN_USERNAME: &str = "admin";

    pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

    pub const DEFAULT_ADMIN_EMAIL: &str = "admin@moviewatchlist.com";
}
