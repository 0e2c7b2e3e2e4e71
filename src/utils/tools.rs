//! Startup tools

use anyhow::{Context, Result};
use serde::Deserialize;
use sqlx::SqlitePool;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::config::{Paths, ServerConfig};
use crate::db::UserTable;
use crate::models::User;
use crate::utils::auth::hash_password;

/// JSON setup file: settings plus an optional admin account to seed
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SetupFile {
    #[serde(flatten)]
    config: ServerConfig,
    admin_username: Option<String>,
    admin_password: Option<String>,
    admin_display_name: Option<String>,
}

/// Apply setup from a JSON file: saves the settings and creates the admin
/// account when credentials are given and the username is still free.
///
/// Returns the settings that are now in effect.
pub async fn apply_setup_file(path: &Path, paths: &Paths, pool: &SqlitePool) -> Result<ServerConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Failed to read setup file: {}", path.display()))?;
    let mut setup: SetupFile = serde_json::from_str(&data).context("Invalid setup file JSON")?;

    // keep the existing secret so issued tokens survive a re-applied setup
    if setup.config.server_id.is_empty() {
        setup.config.server_id = ServerConfig::load(paths)?.server_id;
    }
    setup.config.ensure_server_id();
    setup.config.save(paths)?;

    if let (Some(username), Some(password)) = (
        setup.admin_username.as_deref(),
        setup.admin_password.as_deref(),
    ) {
        if UserTable::get_by_username(pool, username).await?.is_none() {
            let display_name = setup
                .admin_display_name
                .clone()
                .unwrap_or_else(|| username.to_string());
            let admin = User::admin(username.to_string(), hash_password(password), display_name);
            UserTable::insert(pool, &admin).await?;
            info!("Admin user '{}' created from setup file", username);
        }
    }

    Ok(setup.config)
}
