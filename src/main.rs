// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 ScholarStream

mod api;
mod auth;
mod config;
mod error;
mod providers;
mod state;
mod storage;

#[cfg(not(test))]
use std::{env, net::SocketAddr};

#[cfg(not(test))]
use api::router;
#[cfg(not(test))]
use config::{
    ADMIN_EMAIL_ENV, DATA_DIR_ENV, DEFAULT_DATA_DIR, HOST_ENV, LOG_FORMAT_ENV, PORT_ENV,
    SUPER_ADMIN_EMAIL_ENV, TOKEN_SECRET_ENV,
};
#[cfg(not(test))]
use state::{AppState, AuthConfig};
#[cfg(not(test))]
use storage::{DocumentStorage, StoragePaths};
#[cfg(not(test))]
use tracing::{info, warn};
#[cfg(not(test))]
use tracing_subscriber::EnvFilter;

#[cfg(not(test))]
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    if env::var(LOG_FORMAT_ENV).as_deref() == Ok("json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[cfg(not(test))]
fn non_empty_env(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(not(test))]
#[tokio::main]
async fn main() {
    init_tracing();

    // Initialize document storage
    let data_dir = env::var(DATA_DIR_ENV).unwrap_or_else(|_| DEFAULT_DATA_DIR.to_string());
    let mut storage = DocumentStorage::new(StoragePaths::new(&data_dir));
    storage
        .initialize()
        .expect("Failed to initialize document storage");

    // Assemble auth configuration
    let token_secret = non_empty_env(TOKEN_SECRET_ENV).unwrap_or_else(|| {
        warn!("TOKEN_SECRET is not set; using the insecure development secret");
        AuthConfig::default().token_secret
    });
    let auth_config = AuthConfig {
        token_secret,
        admin_email: non_empty_env(ADMIN_EMAIL_ENV),
        super_admin_email: non_empty_env(SUPER_ADMIN_EMAIL_ENV),
    };

    let state = AppState::new(storage).with_auth_config(auth_config);
    let app = router(state);

    // Parse bind address
    let host = env::var(HOST_ENV).unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var(PORT_ENV)
        .unwrap_or_else(|_| "3000".to_string())
        .parse()
        .unwrap_or(3000);

    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .expect("Failed to parse bind address");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind server address");

    info!("scholarstream-server listening on http://{addr} (docs at /docs)");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("HTTP server failed");
}

#[cfg(not(test))]
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to listen for shutdown signal");
    info!("shutdown signal received");
}
