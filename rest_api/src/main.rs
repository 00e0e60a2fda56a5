// rest_api/src/main.rs

use std::env;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::oneshot;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use models::{Account, NewAccount, Role};
use rest_api::config::load_rest_api_config;
use rest_api::{start_server, AppState};
use storage::{HmsStore, MemoryStore};

/// Creates the bootstrap admin account when `HMS_ADMIN_PASSWORD` is set and
/// the username is still free. Without it the admin endpoints stay
/// unreachable until an account is provisioned some other way.
async fn bootstrap_admin(store: &dyn HmsStore) -> Result<()> {
    let Ok(password) = env::var("HMS_ADMIN_PASSWORD") else {
        warn!("HMS_ADMIN_PASSWORD not set; skipping bootstrap admin account");
        return Ok(());
    };
    let username = env::var("HMS_ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());

    if store.get_account_by_username(&username).await?.is_some() {
        return Ok(());
    }

    let account = Account::from_new_account(NewAccount {
        username: username.clone(),
        password,
        email: env::var("HMS_ADMIN_EMAIL").unwrap_or_default(),
        first_name: "System".to_string(),
        last_name: "Administrator".to_string(),
        role: Role::Admin,
    })?;
    store.create_account(account).await?;
    info!(%username, "bootstrap admin account created");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = load_rest_api_config()?;
    let store = Arc::new(MemoryStore::new());

    // role groups exist up front so registration can attach accounts
    for role in [Role::Admin, Role::Doctor, Role::Patient, Role::Receptionist] {
        store.ensure_group(role.group_name()).await?;
    }
    bootstrap_admin(store.as_ref()).await?;

    let state = AppState::new(store, config);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            let _ = shutdown_tx.send(());
        }
    });

    start_server(state, shutdown_rx).await
}
