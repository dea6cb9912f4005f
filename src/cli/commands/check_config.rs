//! Check config command handler

use crate::config::Config;
use crate::db::Store;

pub async fn cmd_check_config(config: &Config) -> anyhow::Result<()> {
    config.validate()?;
    println!("Configuration is valid");
    println!("{:-<50}", "");
    println!("  Port:          {}", config.server.port);
    println!("  Database:      {}", config.general.database_path);
    println!("  Catalog:       {}", config.catalog.base_url);
    println!(
        "  Catalog key:   {}",
        if config.catalog.api_key.is_empty() {
            "missing"
        } else {
            "set"
        }
    );
    println!(
        "  JWT secret:    {}",
        if config.security.jwt_secret.is_empty() {
            "random per process"
        } else {
            "set"
        }
    );
    println!("  Token TTL:     {}h", config.security.token_ttl_hours);

    let store = Store::new(&config.general.database_path).await?;
    store.ping().await?;
    println!("  Database:      reachable");

    Ok(())
}
