use std::sync::Arc;

use crate::clients::TmdbClient;
use crate::config::Config;
use crate::db::Store;
use crate::services::{
    ActivityLogger, AdminService, AuthService, MovieCatalog, SeaOrmAdminService,
    SeaOrmAuthService, SeaOrmWatchlistService, TokenService, WatchlistService,
};
use tracing::{info, warn};

/// Build a shared HTTP client with reasonable defaults for API calls.
/// This client should be reused across all HTTP-based services to enable
/// connection pooling and avoid socket exhaustion.
fn build_shared_http_client(timeout_seconds: u64) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_seconds))
        .user_agent(concat!("Cinelist/", env!("CARGO_PKG_VERSION")))
        .pool_max_idle_per_host(10)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

/// Everything a request handler can reach. Cheap to clone.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub tokens: TokenService,

    pub catalog: Arc<dyn MovieCatalog>,

    pub auth_service: Arc<dyn AuthService>,

    pub watchlist_service: Arc<dyn WatchlistService>,

    pub admin_service: Arc<dyn AdminService>,
}

impl SharedState {
    /// Wires the production TMDB client.
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client(config.catalog.request_timeout_seconds)?;
        if config.catalog.api_key.is_empty() {
            warn!("TMDB_API_KEY is not set; catalog requests will be rejected upstream");
        }
        let catalog = Arc::new(TmdbClient::with_shared_client(
            http_client,
            &config.catalog,
        )) as Arc<dyn MovieCatalog>;

        Self::with_catalog(config, catalog).await
    }

    /// Same wiring with a caller-supplied catalog.
    pub async fn with_catalog(
        config: Config,
        catalog: Arc<dyn MovieCatalog>,
    ) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        let pruned = store.prune_expired_tokens().await?;
        if pruned > 0 {
            info!(pruned, "Pruned expired blacklist entries");
        }

        let secret = if config.security.jwt_secret.is_empty() {
            warn!("JWT_SECRET is not set; using a random secret, tokens will not survive a restart");
            TokenService::random_secret()
        } else {
            config.security.jwt_secret.as_bytes().to_vec()
        };
        let ttl_hours = i64::try_from(config.security.token_ttl_hours)
            .map_err(|_| anyhow::anyhow!("token_ttl_hours is out of range"))?;
        let tokens = TokenService::new(&secret, chrono::Duration::hours(ttl_hours));

        let activity = ActivityLogger::new(store.clone());

        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            tokens.clone(),
            activity.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        let watchlist_service = Arc::new(SeaOrmWatchlistService::new(store.clone(), activity))
            as Arc<dyn WatchlistService>;

        let admin_service = Arc::new(SeaOrmAdminService::new(store.clone())) as Arc<dyn AdminService>;

        Ok(Self {
            config: Arc::new(config),
            store,
            tokens,
            catalog,
            auth_service,
            watchlist_service,
            admin_service,
        })
    }
}
