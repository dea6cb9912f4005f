//! Create admin command handler

use crate::config::Config;
use crate::db::{NewUser, Store};
use crate::domain::Role;

pub async fn cmd_create_admin(
    config: &Config,
    username: &str,
    password: &str,
    email: Option<String>,
) -> anyhow::Result<()> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        anyhow::bail!("Username and password are required");
    }

    let store = Store::new(&config.general.database_path).await?;

    let created = store
        .create_user(
            NewUser {
                username: username.to_string(),
                email,
                password: password.to_string(),
                role: Role::Admin,
                profile_photo: None,
            },
            Some(&config.security),
        )
        .await?;

    match created {
        Some(user) => {
            println!("Created admin '{}' (ID: {})", user.username, user.id);
            Ok(())
        }
        None => anyhow::bail!("Username '{username}' already exists"),
    }
}
